use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::core::FileFailure;

// .als は gzip 圧縮された XML。展開後のバイト列をそのまま返す。
pub fn read_project(path: &Path) -> Result<Vec<u8>, FileFailure> {
    let file = File::open(path)
        .map_err(|err| FileFailure::io(format!("ファイルを開けません: {err}")))?;

    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut content = Vec::new();
    match decoder.read_to_end(&mut content) {
        Ok(_) => Ok(content),
        Err(err) => match err.kind() {
            std::io::ErrorKind::InvalidInput
            | std::io::ErrorKind::InvalidData
            | std::io::ErrorKind::UnexpectedEof => Err(FileFailure::format(format!(
                "gzip として展開できません: {err}"
            ))),
            _ => Err(FileFailure::io(format!("読み取りに失敗しました: {err}"))),
        },
    }
}
