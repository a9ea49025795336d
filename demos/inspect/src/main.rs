// =============================================================================
// inspect: summarize a TinyImageNet split on disk
// =============================================================================
//
// Builds the index for one split and prints:
//   1. sample and class counts
//   2. the most populated classes (labeled splits only)
//   3. optionally, the decoded size of the first N samples
//
// Usage:
//   cargo run -p inspect -- data/tiny-imagenet-200
//   cargo run -p inspect -- data/tiny-imagenet-200 --split val --words --top 5
//   RUST_LOG=debug cargo run -p inspect -- data/tiny-imagenet-200 --decode 3

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tinyimagenet::{Split, TinyImageNet, UNLABELED};

#[derive(Parser, Debug)]
#[command(version, about = "Summarize a TinyImageNet split on disk")]
struct Args {
    /// Dataset root (the directory holding wnids.txt).
    root: PathBuf,

    /// Split to index: train, val or test.
    #[arg(long, default_value = "train")]
    split: Split,

    /// Resolve class names from words.txt.
    #[arg(long)]
    words: bool,

    /// Number of classes to list, by sample count.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Decode the first N samples and print their sizes.
    #[arg(long, default_value_t = 0)]
    decode: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let ds = TinyImageNet::new(&args.root)
        .split(args.split)
        .use_words(args.words)
        .build()?;

    println!("root:     {}", ds.root().display());
    println!("split:    {}", ds.split());
    println!("samples:  {}", ds.len());
    println!("classes:  {}", ds.num_classes());

    if ds.is_labeled() {
        let mut counts = vec![0usize; ds.num_classes()];
        for &label in ds.labels() {
            counts[label as usize] += 1;
        }
        let mut ranked: Vec<(usize, usize)> = counts.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        println!();
        println!("{:>6}  {:<12} name", "count", "wnid");
        for (label, count) in ranked.into_iter().take(args.top) {
            println!(
                "{:>6}  {:<12} {}",
                count,
                ds.classes()[label],
                ds.class_names()[label]
            );
        }
    }

    if args.decode > 0 {
        println!();
        for i in 0..args.decode.min(ds.len()) {
            match ds.get(i) {
                Ok((image, label)) => {
                    let class = if label == UNLABELED {
                        "-"
                    } else {
                        ds.class_name(label).unwrap_or("?")
                    };
                    println!(
                        "{:>6}  {}x{}  {}  {}",
                        i,
                        image.width(),
                        image.height(),
                        class,
                        ds.path_of(i).map(|p| p.display().to_string()).unwrap_or_default()
                    );
                }
                Err(e) => error!("sample {i}: {e}"),
            }
        }
    }

    info!("done");
    Ok(())
}
