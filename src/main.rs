use std::env;
use std::process;

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 2 {
    let program = args.first().map(String::as_str).unwrap_or("rulec");
    eprintln!("usage: {program} <source>");
    process::exit(1);
  }

  match rulec::compile(&args[1]) {
    Ok(output) => println!("{output}"),
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
