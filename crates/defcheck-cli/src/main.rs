use std::{env, fs, process::ExitCode};

use defcheck::{ChangedMethod, changed_methods, check_source};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: defcheck <diff-file> <ruby-source>...");
        return ExitCode::FAILURE;
    }

    let diff = match fs::read_to_string(&args[1]) {
        Ok(diff) => diff,
        Err(err) => {
            eprintln!("error: can't read {}: {err}", args[1]);
            return ExitCode::FAILURE;
        }
    };

    let changed = changed_methods(&diff);
    if changed.is_empty() {
        println!("no changed method definitions in {}", args[1]);
        return ExitCode::SUCCESS;
    }
    for change in &changed {
        print_change(change);
    }

    let mut failures = 0usize;
    for path in &args[2..] {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: can't read {path}: {err}");
                return ExitCode::FAILURE;
            }
        };
        for finding in check_source(&source, &changed) {
            println!("{path}: {finding}");
            failures += 1;
        }
    }

    if failures == 0 {
        println!("all call sites still bind");
        ExitCode::SUCCESS
    } else {
        println!("{failures} call site(s) no longer bind");
        ExitCode::FAILURE
    }
}

fn print_change(change: &ChangedMethod) {
    match (&change.removed, &change.added) {
        (Some(removed), Some(added)) => println!("{}: {removed} -> {added}", change.path),
        (None, Some(added)) => println!("{}: added {added}", change.path),
        (Some(removed), None) => println!("{}: removed {removed}", change.path),
        (None, None) => {}
    }
}
