fn main() -> std::process::ExitCode {
    formport_lib::run()
}
