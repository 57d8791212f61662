//! Purpose: Drop unrecognized flags before clap parses the argument vector.
//! Exports: `retain_known_flags`.
//! Role: Keeps the CLI tolerant of extra `--name value` pairs from scripted callers.
//! Invariants: Recognized flags and their values pass through untouched and in order.
//! Invariants: Unknown flags, and stray values inside a subcommand without positionals, are dropped.
//! Invariants: A bare value directly after a dropped `--name` is dropped with it, unless it names a subcommand.
use clap::{Arg, Command};
use std::ffi::OsString;
use tracing::debug;

pub(crate) fn retain_known_flags<I>(root: &Command, args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut pending = args.into_iter();
    let mut out: Vec<OsString> = pending.next().into_iter().collect();
    let mut subcommand: Option<&Command> = None;
    let mut after_unknown_long = false;

    while let Some(arg) = pending.next() {
        let text = arg.to_string_lossy().into_owned();
        let active = subcommand.unwrap_or(root);
        let orphaned_value = std::mem::take(&mut after_unknown_long);

        let known = if let Some(flag) = text.strip_prefix("--").filter(|flag| !flag.is_empty()) {
            let (name, has_inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            find_arg(active, root, |candidate| candidate.get_long() == Some(name))
                .map(|found| takes_value(found) && !has_inline_value)
        } else if let Some(shorts) = text.strip_prefix('-').filter(|rest| !rest.is_empty()) {
            let mut chars = shorts.chars();
            let short = chars.next();
            let has_inline_value = chars.next().is_some();
            short
                .and_then(|short| {
                    find_arg(active, root, |candidate| candidate.get_short() == Some(short))
                })
                .map(|found| takes_value(found) && !has_inline_value)
        } else {
            match subcommand {
                None => match root.find_subcommand(&arg) {
                    Some(found) => {
                        subcommand = Some(found);
                        out.push(arg);
                    }
                    None if orphaned_value => {
                        debug!(value = %text, "ignoring value of unrecognized flag")
                    }
                    None => out.push(arg),
                },
                Some(active) if active.get_positionals().next().is_some() && !orphaned_value => {
                    out.push(arg)
                }
                Some(_) => debug!(value = %text, "ignoring stray argument"),
            }
            continue;
        };

        match known {
            Some(expects_value) => {
                out.push(arg);
                if expects_value {
                    if let Some(value) = pending.next() {
                        out.push(value);
                    }
                }
            }
            None => {
                debug!(flag = %text, "ignoring unrecognized flag");
                after_unknown_long = text.starts_with("--") && !text.contains('=');
            }
        }
    }

    out
}

fn find_arg<'a, F>(active: &'a Command, root: &'a Command, matches: F) -> Option<&'a Arg>
where
    F: Fn(&Arg) -> bool,
{
    active.get_arguments().find(|arg| matches(*arg)).or_else(|| {
        root.get_arguments()
            .filter(|arg| arg.is_global_set())
            .find(|arg| matches(*arg))
    })
}

fn takes_value(arg: &Arg) -> bool {
    arg.get_action().takes_values()
}
