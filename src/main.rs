use anyhow::Result;

fn main() -> Result<()> {
    xapi_backfill::cli::run()
}
