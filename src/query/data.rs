use crate::error::{MiError, Result};
use crate::mi::session::MiSession;
use crate::mi::transport::Transport;

/// Largest single write accepted by [`MiSession::write_memory`].
pub const MAX_WRITE_BYTES: usize = 256;

/// `set {unsigned char[N]}(0x..) = {0x.., ...}`
pub fn write_memory_command(address: u64, bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(MiError::InvalidArgument("nothing to write"));
    }
    if bytes.len() > MAX_WRITE_BYTES {
        return Err(MiError::InvalidArgument("write larger than 256 bytes"));
    }
    let values: Vec<String> = bytes.iter().map(|b| format!("{:#04x}", b)).collect();
    Ok(format!(
        "set {{unsigned char[{}]}}({:#x}) = {{{}}}",
        bytes.len(),
        address,
        values.join(", ")
    ))
}

impl<T: Transport> MiSession<T> {
    /// Overwrite inferior memory at `address` with `bytes`.
    pub fn write_memory(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
        let command = write_memory_command(address, bytes)?;
        self.capture_console(&command)?;
        Ok(())
    }

    /// Store `value` as a `long` at `address`.
    pub fn write_value(&mut self, address: u64, value: i64) -> Result<()> {
        self.capture_console(&format!("set {{long}}({:#x}) = {}", address, value))?;
        Ok(())
    }
}
