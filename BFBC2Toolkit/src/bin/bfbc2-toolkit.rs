fn main() -> anyhow::Result<()> {
    bfbc2_toolkit::cli::run_cli()
}
