use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use keydispatch::cli::{CliArgs, CliCommand};
use keydispatch::config::Settings;
use keydispatch::keymap::{load_default_keymap, load_keymap_file, merge_rules, Resolver};
use keydispatch::replay;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    keydispatch::tracing::init();

    let settings = Settings::load();
    let include_defaults = args.include_defaults(settings.default_keymap);

    match &args.command {
        CliCommand::Check { path } => check(path),
        CliCommand::Which { command } => {
            let resolver = build_resolver(include_defaults, args.keymap.as_deref())?;
            which(&resolver, command);
            Ok(())
        }
        CliCommand::Replay { script } => {
            let resolver = build_resolver(include_defaults, args.keymap.as_deref())?;
            let script = replay::load_script(script)?;
            let (lines, executor) =
                replay::run_script(script, Arc::new(resolver), settings.chord_timing())?;
            for line in &lines {
                println!("{}", replay::format_line(line));
            }
            println!("{} command(s) invoked", executor.invoked.len());
            Ok(())
        }
    }
}

/// Layered keymaps plus an optional extra file on top
fn build_resolver(include_defaults: bool, extra: Option<&Path>) -> Result<Resolver> {
    let mut rules = load_default_keymap(include_defaults);
    if let Some(path) = extra {
        let extra_rules = load_keymap_file(path)
            .with_context(|| format!("Failed to load keymap {}", path.display()))?;
        rules = merge_rules(rules, extra_rules);
    }
    Ok(Resolver::with_rules(rules))
}

fn check(path: &Path) -> Result<()> {
    let rules =
        load_keymap_file(path).with_context(|| format!("Invalid keymap {}", path.display()))?;

    for rule in &rules {
        let command = rule.command.as_deref().unwrap_or("(removed)");
        let when = rule
            .when
            .as_ref()
            .map(|w| format!("  when {}", w))
            .unwrap_or_default();
        println!(
            "{:<32} {:<28} {}{}",
            rule.binding.user_settings_label(),
            command,
            rule.display_string(),
            when
        );
    }
    println!("{}: {} rule(s) OK", path.display(), rules.len());
    Ok(())
}

fn which(resolver: &Resolver, command: &str) {
    let rules = resolver.bindings_for(command);
    if rules.is_empty() {
        println!("{} is not bound", command);
        return;
    }
    for rule in rules {
        println!(
            "{:<32} {}  [{}]",
            rule.binding.user_settings_label(),
            rule.display_string(),
            rule.binding.aria_label()
        );
    }
    if let Some(label) = resolver.label_for(command) {
        println!("preferred: {}", label);
    }
}
