use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    kappachat::cli::main()
}
