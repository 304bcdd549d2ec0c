use pingstat::error::AppResult;

fn main() -> AppResult<()> {
    pingstat::entry::run()
}
