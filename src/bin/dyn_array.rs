use anyhow::{Context, Result, anyhow};
use dynamic_array::cli::{Cli, Command};
use dynamic_array::{DynamicArray, dyn_array};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level())?;

    match cli.command {
        Some(Command::Scenario) => run_scenario().context("Scenario failed")?,
        Some(Command::Grow { count }) => {
            run_grow(count).with_context(|| format!("Growth run with {count} pushes failed"))?
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

fn run_scenario() -> Result<()> {
    let mut v = dyn_array![10, 20, 30];
    report("from [10, 20, 30]", &v);

    let begin = v.begin().index();
    v.insert(begin + 1, 99);
    report("insert 99 before index 1", &v);
    expect(&v, &[10, 99, 20, 30])?;

    let begin = v.begin().index();
    v.erase(begin);
    report("erase index 0", &v);
    expect(&v, &[99, 20, 30])?;

    let cap = v.capacity();
    v.resize(1);
    report("resize to 1", &v);
    expect(&v, &[99])?;
    if v.capacity() != cap {
        return Err(anyhow!("resize(1) changed capacity from {} to {}", cap, v.capacity()));
    }

    v.resize(3);
    report("resize to 3", &v);
    expect(&v, &[99, 0, 0])?;

    println!("back = {}", v.back()?);
    while v.pop().is_ok() {}
    match v.front() {
        Ok(front) => return Err(anyhow!("drained array still has front {}", front)),
        Err(err) => println!("after draining: {:?}, front() -> {}", v, err),
    }

    Ok(())
}

fn run_grow(count: usize) -> Result<()> {
    let mut v = DynamicArray::with_capacity(0);
    let mut cap = v.capacity();
    for i in 1..=count {
        v.push(i);
        if v.capacity() != cap {
            info!(len = v.len(), old_cap = cap, new_cap = v.capacity(), "grew");
            println!("push #{:>6}: capacity {:>6} -> {:>6}", i, cap, v.capacity());
            cap = v.capacity();
        }
    }

    if v.iter().copied().ne(1..=count) {
        return Err(anyhow!("elements out of insertion order after {} pushes", count));
    }
    println!("pushed {} elements, final capacity {}", v.len(), v.capacity());
    Ok(())
}

fn report(step: &str, v: &DynamicArray<i32>) {
    println!("{:<28} {:?} (len {}, cap {})", step, v, v.len(), v.capacity());
}

fn expect(v: &DynamicArray<i32>, want: &[i32]) -> Result<()> {
    if v.as_slice() == want {
        Ok(())
    } else {
        Err(anyhow!("expected {:?}, got {:?}", want, v))
    }
}
