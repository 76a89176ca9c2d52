fn main() -> anyhow::Result<()> {
    pathctx_cli::run()
}
