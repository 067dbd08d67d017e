use bms::config::BmsConfig;
use bms::tooling::cli::{Cli, CliContext, CommandOutput, Commands, ConfigCommands, RootCommands};
use bms::Id;
use clap::{CommandFactory, Parser};
use tempfile::TempDir;

fn text(output: CommandOutput) -> String {
    match output {
        CommandOutput::Text(text) => text,
        CommandOutput::Bytes(bytes) => String::from_utf8(bytes).unwrap(),
    }
}

fn provisioned(temp: &TempDir) -> CliContext {
    let mut config = BmsConfig::default();
    config.storage.data_dir = Some(temp.path().to_path_buf());
    config.session.owner = Some(Id::new());

    let bootstrap = CliContext::new(config.clone()).unwrap();
    let out = text(
        bootstrap
            .execute(&Commands::Root {
                command: RootCommands::Create { perm: 0o700 },
            })
            .unwrap(),
    );
    let root = out
        .lines()
        .find_map(|l| l.strip_prefix("export BMS__SESSION__ROOT="))
        .unwrap()
        .parse::<Id>()
        .unwrap();
    drop(bootstrap);

    config.session.root = Some(root);
    CliContext::new(config).unwrap()
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["bms", "root", "create"],
        vec!["bms", "mkdir", "-p", "/a/b"],
        vec!["bms", "ls"],
        vec!["bms", "ls", "/a", "--format", "json"],
        vec!["bms", "put", "/a/f", "./local.txt", "--append"],
        vec!["bms", "cat", "/a/f"],
        vec!["bms", "rm", "/a"],
        vec!["bms", "mv", "/a", "/b"],
        vec!["bms", "stat", "/a", "--format", "json"],
        vec!["bms", "chmod", "0o640", "/a/f"],
        vec!["bms", "chown", "6ba7b810-9dad-11d1-80b4-00c04fd430c8", "/a/f"],
        vec!["bms", "touch", "/a/f"],
        vec!["bms", "inspect", "6ba7b810-9dad-11d1-80b4-00c04fd430c8"],
        vec!["bms", "config", "show"],
        vec!["bms", "--data-dir", "/tmp/bms", "--log-level", "debug", "ls"],
    ];
    for args in cases {
        assert!(Cli::try_parse_from(args.clone()).is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_bad_identifiers_and_modes() {
    assert!(Cli::try_parse_from(["bms", "inspect", "not-an-id"]).is_err());
    assert!(Cli::try_parse_from(["bms", "chmod", "888", "/f"]).is_err());
    assert!(Cli::try_parse_from(["bms", "--root", "xyz", "ls"]).is_err());
    Cli::command().debug_assert();
}

#[test]
fn stat_json_contract_has_required_fields() {
    let temp = TempDir::new().unwrap();
    let cli = provisioned(&temp);
    cli.execute(&Commands::Mkdir {
        path: "/docs".to_string(),
        perm: 0o750,
        parents: false,
    })
    .unwrap();

    let out = text(
        cli.execute(&Commands::Stat {
            path: "/docs".to_string(),
            format: "json".to_string(),
        })
        .unwrap(),
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["name"], "docs");
    assert_eq!(parsed["is_dir"], true);
    assert!(parsed.get("id").and_then(|v| v.as_str()).is_some());
    assert!(parsed.get("owner").and_then(|v| v.as_str()).is_some());
    assert!(parsed.get("size").and_then(|v| v.as_u64()).is_some());
    assert!(parsed.get("modified").and_then(|v| v.as_str()).is_some());
}

#[test]
fn ls_text_renders_table() {
    let temp = TempDir::new().unwrap();
    let cli = provisioned(&temp);
    cli.execute(&Commands::Mkdir {
        path: "/reports".to_string(),
        perm: 0o755,
        parents: false,
    })
    .unwrap();
    let out = text(
        cli.execute(&Commands::Ls {
            path: "/".to_string(),
            format: "text".to_string(),
        })
        .unwrap(),
    );
    assert!(out.contains("Name"));
    assert!(out.contains("reports"));
    assert!(out.contains("drwxr-xr-x"));
}

#[test]
fn mv_chmod_and_config_show() {
    let temp = TempDir::new().unwrap();
    let cli = provisioned(&temp);
    cli.execute(&Commands::Mkdir {
        path: "/a".to_string(),
        perm: 0o755,
        parents: false,
    })
    .unwrap();
    cli.execute(&Commands::Mv {
        from: "/a".to_string(),
        to: "/b".to_string(),
    })
    .unwrap();
    let out = text(
        cli.execute(&Commands::Chmod {
            perm: 0o700,
            path: "/b".to_string(),
        })
        .unwrap(),
    );
    assert_eq!(out, "drwx------ /b");

    let shown = text(
        cli.execute(&Commands::Config {
            command: ConfigCommands::Show,
        })
        .unwrap(),
    );
    let parsed: BmsConfig = toml::from_str(&shown).unwrap();
    assert_eq!(parsed.session.root, cli.config().session.root);
}
