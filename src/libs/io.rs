use std::io::{BufRead, BufReader, BufWriter, Write};

/// Opens a gene or segment file; `stdin` reads standard input and a `.gz`
/// suffix is decompressed.
///
/// ```
/// use std::io::BufRead;
/// let reader = chsm::reader("tests/chsm/genes.tsv").unwrap();
/// let records = reader
///     .lines()
///     .map_while(Result::ok)
///     .filter(|l| !l.starts_with('#'))
///     .count();
/// assert_eq!(records, 15);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("could not open {}: {}", path.display(), e))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Creates `output`, or writes to standard output for `stdout`.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .map_err(|e| anyhow::anyhow!("could not create {}: {}", output, e))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}
