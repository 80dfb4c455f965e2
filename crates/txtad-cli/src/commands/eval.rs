use txtad_core::Interpreter;

pub fn run(expression: &str) -> Result<(), String> {
    let value = Interpreter::new()
        .evaluate(expression)
        .map_err(|e| e.to_string())?;
    println!("{value}");
    Ok(())
}
