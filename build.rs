use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder().git_describe(true, true, None).emit()?;
    Ok(())
}
