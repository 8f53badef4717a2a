use depscope_depgraph::supported_languages;

pub fn run() -> anyhow::Result<()> {
    let languages = supported_languages();

    let name_width = languages
        .iter()
        .map(|l| l.name.len())
        .max()
        .unwrap_or(0)
        .max("LANGUAGE".len());
    let ext_width = languages
        .iter()
        .map(|l| l.extensions.join(" ").len())
        .max()
        .unwrap_or(0)
        .max("EXTENSIONS".len());

    println!("{:name_width$}  {:ext_width$}  MATURITY", "LANGUAGE", "EXTENSIONS");
    for language in &languages {
        println!(
            "{:name_width$}  {:ext_width$}  {}",
            language.name,
            language.extensions.join(" "),
            language.maturity
        );
    }
    Ok(())
}
