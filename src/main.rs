use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;

use linattack::attack::{perform_linear_cryptanalysis, AttackParams};
use linattack::bits::{fmt_bits, to_bits};
use linattack::samples::{generate_samples, random_key};
use linattack::table::BiasTable;

mod options;

use crate::options::LinattackOptions;

fn main() {
    match LinattackOptions::from_args() {
        LinattackOptions::Attack { samples, table, trails, seed } => {
            let table = match BiasTable::load(&table) {
                Ok(table) => table,
                Err(error) => {
                    eprintln!("Could not load the bias table: {}", error);
                    process::exit(1);
                }
            };

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let key = random_key(&mut rng);

            match to_bits(key.to_u128(), 80) {
                Ok(bits) => println!("Attacked key: {}", fmt_bits(&bits)),
                Err(error) => {
                    eprintln!("Could not format the key: {}", error);
                    process::exit(1);
                }
            }

            println!("Generating {} known pairs.", samples);
            let pairs = generate_samples(&mut rng, samples, &key);

            let params = AttackParams { max_trails: trails };
            let recovered = perform_linear_cryptanalysis(&table, &pairs, key.high, &params);

            match recovered {
                Some(found) if found == key.low => {
                    println!("Success: recovered round key matches the attacked key.");
                }
                Some(found) => {
                    // Unreachable in practice, verification is exact.
                    println!(
                        "Recovered {:#06x} but the attacked key holds {:#06x}.",
                        found, key.low
                    );
                    process::exit(1);
                }
                None => {
                    println!("Attack failed; rerun with a fresh sample set.");
                    process::exit(1);
                }
            }
        }
        LinattackOptions::Table { table } => {
            let computed = BiasTable::build();

            if let Err(error) = computed.write(&table) {
                eprintln!("Could not write the bias table: {}", error);
                process::exit(1);
            }

            println!("{}", computed);
        }
    }
}
