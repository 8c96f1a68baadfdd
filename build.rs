use shadow_rs::ShadowBuilder;

// Exposes build metadata to `shadow!(build)` for `--version`.
fn main() -> Result<(), shadow_rs::ShadowError> {
    ShadowBuilder::builder().build()?;
    Ok(())
}
