mod entry;
mod logger;

use dialtrail::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
