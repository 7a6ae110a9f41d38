use rckeys::keytable::KeyTable;

pub fn keytable(args: &crate::Keytable) {
    let table = match KeyTable::parse_file(&args.keytable) {
        Ok(table) => table,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    if table.release_on_repeat_escalation {
        println!("release-on-repeat-escalation");
    }

    for e in &table.commands {
        println!("command {} {:#x}", e.name, e.code);
    }

    for e in &table.keys {
        println!(
            "key {} {:#x}{}",
            e.name,
            e.code,
            if e.repeat { " repeat" } else { "" }
        );
    }
}
