use matching_engine::cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
