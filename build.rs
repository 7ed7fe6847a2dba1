use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    let cargo = CargoBuilder::default().target_triple(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    let mut emitter = Emitter::default();
    emitter
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?;

    // Source tarballs have no repository; the about page shows "unknown".
    match Git2Builder::default()
        .branch(true)
        .describe(true, true, None)
        .sha(true)
        .build()
    {
        Ok(git2) => {
            emitter.add_instructions(&git2)?;
        }
        Err(_) => {
            for key in ["VERGEN_GIT_BRANCH", "VERGEN_GIT_DESCRIBE", "VERGEN_GIT_SHA"] {
                println!("cargo:rustc-env={key}=unknown");
            }
        }
    }

    emitter.emit()?;
    Ok(())
}
