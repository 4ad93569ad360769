fn main() -> std::process::ExitCode {
    testscope_cli::run()
}
