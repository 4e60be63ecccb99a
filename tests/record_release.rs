use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use gdb_console_query::query::{CatchKind, Catchpoint, Function, SourceLine, TypeInfo, Variable};
use gdb_console_query::{MiSession, ScriptedTransport};

struct CountingAlloc;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn bump(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        bump(1);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        bump(-1);
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn live() -> isize {
    LIVE.with(Cell::get)
}

const LISTING: &str = "All defined functions:\n\nFile main.c:\n\
0x0000000000401136 main(int, char**) at main.c:10\n\
0x0000000000401160 static helper(void) at main.c:22\n\
\nNon-debugging symbols:\n0x0000000000401000 _init\n";

#[test]
fn dropping_records_releases_every_allocation() {
    let before = live();
    {
        let mut records = Vec::new();
        for i in 0..64u32 {
            records.push(Function {
                name: Some(format!("fn_{}", i)),
                file: Some("main.c".to_string()),
                line: Some(i + 1),
                address: Some(0x401000 + u64::from(i)),
                signature: Some(format!("fn_{}(int)", i)),
                is_static: i % 2 == 0,
            });
        }
        let lines: Vec<SourceLine> = (1..=32)
            .map(|n| SourceLine {
                line: n,
                text: Some(format!("int x{} = {};", n, n)),
                ..SourceLine::default()
            })
            .collect();
        let vars = vec![Variable {
            name: "counter".into(),
            type_name: "static int".into(),
            file: Some("main.c".into()),
            line: Some(3),
            is_static: true,
        }];
        let ty = TypeInfo {
            name: "struct point".into(),
            members: "type = struct point {\n    int x;\n}\n".into(),
            ..TypeInfo::default()
        };
        let cp = Catchpoint {
            number: 1,
            kind: CatchKind::Syscall,
            event: Some("write".into()),
            ..Catchpoint::default()
        };
        assert!(live() > before);
        assert_eq!(records.len(), 64);
        drop((records, lines, vars, ty, cp));
    }
    assert_eq!(live(), before);
}

fn list_once() -> usize {
    let mut session = MiSession::new(ScriptedTransport::new());
    session.transport_mut().reply_console(LISTING);
    let funcs = session.list_functions(None).expect("listing");
    funcs.len()
}

#[test]
fn extracted_listing_is_released_with_its_session() {
    // First run registers logging callsites, which stay alive for the process.
    assert_eq!(list_once(), 3);

    let before = live();
    assert_eq!(list_once(), 3);
    assert_eq!(live(), before);
}
