use rckeys::replay::Script;

pub fn replay(replay: &crate::Replay) {
    let normalizer = super::normalizer(&replay.classify);

    let script = match Script::parse_file(&replay.script) {
        Ok(script) => script,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    script.run(normalizer, |ev| {
        if replay.classify.wanted(ev.kind) {
            println!("{ev}");
        }
    });
}
