use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    Init,
    Review {
        #[clap(short, long)]
        file: Vec<String>,
    },
    Sessions,
    Show {
        data_id: Option<String>,
    },
    Delete {
        data_id: String,
    },
    Stop {
        data_id: String,
    },
    Resolve {
        data_id: String,
        comment_id: String,
    },
}
