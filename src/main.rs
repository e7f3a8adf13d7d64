fn main() -> anyhow::Result<()> {
    jukebox::cli::run_cli()
}
