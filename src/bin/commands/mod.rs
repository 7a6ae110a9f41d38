use rckeys::{keytable::KeyTable, normalize::Normalizer};

pub mod keytable;
pub mod list;
pub mod listen;
pub mod replay;

/// Build the normalizer from the key table argument, if any
fn normalizer(classify: &crate::Classify) -> Normalizer {
    let table = match &classify.keytable {
        Some(path) => match KeyTable::parse_file(path) {
            Ok(table) => {
                log::debug!(
                    "{}: {} commands, {} keys",
                    path.display(),
                    table.commands.len(),
                    table.keys.len()
                );
                table
            }
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        None => KeyTable::default(),
    };

    let escalation = table.release_on_repeat_escalation || classify.release_on_repeat_escalation;

    Normalizer::new(table).release_on_repeat_escalation(escalation)
}
