use structopt::StructOpt;

#[derive(Clone, StructOpt)]
#[structopt(name = "linattack", about = "Linear cryptanalysis of a toy 16-bit SPN block cipher.")]
pub enum LinattackOptions {
    #[structopt(name = "attack")]
    Attack {
        #[structopt(short = "n", long = "samples", default_value = "40000")]
        /**
        Number of known plaintext/ciphertext pairs to generate for the attack.
        */
        samples: usize,

        #[structopt(short = "t", long = "table", default_value = "bias_table")]
        /**
        Path of the bias table file. The table is computed and written there if the file does not exist.
        */
        table: String,

        #[structopt(short = "m", long = "trails", default_value = "20")]
        /**
        Maximum number of linear trails to discover and estimate. The attack stops earlier once every first-round output bit is covered.
        */
        trails: usize,

        #[structopt(short = "s", long = "seed")]
        /**
        If provided, seeds the random generator used for the key and the samples, making the run reproducible.
        */
        seed: Option<u64>,
    },

    #[structopt(name = "table")]
    Table {
        #[structopt(short = "t", long = "table", default_value = "bias_table")]
        /**
        Path of the bias table file to compute and write.
        */
        table: String,
    },
}
