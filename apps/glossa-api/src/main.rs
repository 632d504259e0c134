use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = glossa_api::Args::parse();
	glossa_api::run(args).await
}
