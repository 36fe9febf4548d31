use std::{env, fs, process::ExitCode};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("usage: mamba <script.py>");
        return ExitCode::FAILURE;
    };

    let code = match fs::read_to_string(file_path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("mamba: could not read '{file_path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    match mamba::interpret(file_path, &code) {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
