use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_opens_home() {
    let args = parse_args(&["kappachat"]);
    assert!(args.command.is_none());
    assert!(args.log.is_none());
}

#[test]
fn global_flags_parse_after_subcommands() {
    let args = parse_args(&[
        "kappachat",
        "chat",
        "coach",
        "--log",
        "debug.log",
        "-t",
        "chat.txt",
        "--no-typing",
    ]);
    assert_eq!(args.log.as_deref(), Some("debug.log"));
    assert_eq!(args.transcript.as_deref(), Some("chat.txt"));
    match args.command {
        Some(Commands::Chat {
            character,
            no_typing,
        }) => {
            assert_eq!(character, "coach");
            assert!(no_typing);
        }
        _ => panic!("expected chat subcommand"),
    }
}

#[test]
fn character_create_accepts_fields() {
    let args = parse_args(&[
        "kappachat",
        "character",
        "create",
        "--name",
        "Nova",
        "--personality",
        "Curious",
    ]);
    match args.command {
        Some(Commands::Character {
            command: CharacterCommands::Create { fields },
        }) => {
            assert_eq!(fields.name.as_deref(), Some("Nova"));
            assert_eq!(fields.personality.as_deref(), Some("Curious"));
            assert!(fields.description.is_none());
        }
        _ => panic!("expected character create subcommand"),
    }
}

#[test]
fn character_delete_takes_confirmation_flag() {
    let args = parse_args(&["kappachat", "character", "delete", "abc", "-y"]);
    assert!(matches!(
        args.command,
        Some(Commands::Character {
            command: CharacterCommands::Delete { ref id, yes: true }
        }) if id == "abc"
    ));
}

#[test]
fn register_image_defaults_to_empty() {
    let args = parse_args(&["kappachat", "register", "ada"]);
    match args.command {
        Some(Commands::Register { username, image }) => {
            assert_eq!(username.as_deref(), Some("ada"));
            assert_eq!(image, "");
        }
        _ => panic!("expected register subcommand"),
    }
}

#[test]
fn set_requires_key_and_value() {
    assert!(Args::try_parse_from(["kappachat", "set", "api-base-url"]).is_err());
    let args = parse_args(&["kappachat", "set", "api-base-url", "http://localhost:8000"]);
    assert!(matches!(args.command, Some(Commands::Set { .. })));
}

#[test]
fn only_data_commands_sync_at_startup() {
    assert!(Commands::Characters.needs_sync());
    assert!(Commands::Open { path: "/".into() }.needs_sync());
    assert!(!Commands::Login { username: None }.needs_sync());
    assert!(!Commands::About.needs_sync());
}
