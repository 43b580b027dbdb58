fn main() {
    if let Err(err) = alsaudit::cli::run() {
        alsaudit::ui::eprintln_error(&err);
        std::process::exit(alsaudit::exit::exit_code(&err));
    }
}
