use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::fs;
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

use srcpatch::stream::{OpenFlags, OpenMode, StreamBroker};
use srcpatch::transform::{SubstitutionTransformer, TransformerRegistry};
use srcpatch::LoadInterceptor;

/// Source-ish text over a small alphabet, with plenty of newlines so the
/// line-buffered rewrite path gets exercised.
#[derive(Debug, Clone)]
struct SourceText(String);

impl Arbitrary for SourceText {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 512;
        let alphabet = b"abcdefgh aeiou AEIOU\n\n() {};=";
        let text = (0..len)
            .map(|_| {
                let i = usize::arbitrary(g) % alphabet.len();
                alphabet[i] as char
            })
            .collect();
        SourceText(text)
    }
}

/// Read chunk sizes worth testing: 1 byte up to a small buffer.
#[derive(Debug, Clone, Copy)]
struct ChunkSize(usize);

impl Arbitrary for ChunkSize {
    fn arbitrary(g: &mut Gen) -> Self {
        ChunkSize(1 + usize::arbitrary(g) % 64)
    }
}

/// A broker with an installed interceptor carrying one substitution rule.
fn stack_with_rule(rule: &str) -> Result<(StreamBroker, LoadInterceptor), String> {
    let transformer = SubstitutionTransformer::single("rewrite", rule)
        .map_err(|e| format!("bad rule: {e}"))?;
    let registry = Arc::new(TransformerRegistry::new());
    registry.register(Arc::new(transformer));

    let streams = StreamBroker::new();
    let interceptor = LoadInterceptor::new(registry);
    interceptor
        .intercept(&streams)
        .map_err(|e| format!("install failed: {e}"))?;
    Ok((streams, interceptor))
}

fn write_fixture(dir: &TempDir, contents: &[u8]) -> Result<String, String> {
    let path = dir.path().join("fixture.src");
    fs::write(&path, contents).map_err(|e| format!("failed to write fixture: {e}"))?;
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| "fixture path is not UTF-8".to_string())
}

#[quickcheck]
fn ordinary_opens_return_exact_bytes(content: Vec<u8>) -> Result<bool, String> {
    let dir = TempDir::new().map_err(|e| format!("failed to create temp dir: {e}"))?;
    let url = write_fixture(&dir, &content)?;

    let (streams, _interceptor) = stack_with_rule("s/[aeiou]/_/g")?;
    let mut handle = streams
        .open(&url, OpenMode::read_only(), OpenFlags::empty(), None)
        .map_err(|e| format!("open failed: {e}"))?;
    let mut out = Vec::new();
    handle
        .read_to_end(&mut out)
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(out == content)
}

#[quickcheck]
fn chunked_code_loads_match_a_whole_read(
    text: SourceText,
    chunk: ChunkSize,
) -> Result<bool, String> {
    let dir = TempDir::new().map_err(|e| format!("failed to create temp dir: {e}"))?;
    let url = write_fixture(&dir, text.0.as_bytes())?;
    let (streams, _interceptor) = stack_with_rule("s/[aeiou]/_/g")?;

    let mut whole = Vec::new();
    streams
        .open(&url, OpenMode::read_only(), OpenFlags::CODE_LOAD, None)
        .map_err(|e| format!("open failed: {e}"))?
        .read_to_end(&mut whole)
        .map_err(|e| format!("read failed: {e}"))?;

    let mut handle = streams
        .open(&url, OpenMode::read_only(), OpenFlags::CODE_LOAD, None)
        .map_err(|e| format!("open failed: {e}"))?;
    let mut chunked = Vec::new();
    let mut buf = vec![0u8; chunk.0];
    loop {
        let n = handle
            .read(&mut buf)
            .map_err(|e| format!("read failed: {e}"))?;
        if n == 0 {
            break;
        }
        chunked.extend_from_slice(&buf[..n]);
    }

    Ok(whole == chunked && handle.eof())
}

#[quickcheck]
fn code_loads_rewrite_like_a_whole_file_pass(text: SourceText) -> Result<bool, String> {
    let dir = TempDir::new().map_err(|e| format!("failed to create temp dir: {e}"))?;
    let url = write_fixture(&dir, text.0.as_bytes())?;
    let (streams, _interceptor) = stack_with_rule("s/a/b/g")?;

    let mut out = String::new();
    streams
        .open(&url, OpenMode::read_only(), OpenFlags::CODE_LOAD, None)
        .map_err(|e| format!("open failed: {e}"))?
        .read_to_string(&mut out)
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(out == text.0.replace('a', "b"))
}

#[quickcheck]
fn eof_is_set_once_a_code_load_drains(text: SourceText) -> Result<bool, String> {
    let dir = TempDir::new().map_err(|e| format!("failed to create temp dir: {e}"))?;
    let url = write_fixture(&dir, text.0.as_bytes())?;
    let (streams, _interceptor) = stack_with_rule("s/[aeiou]/_/g")?;

    let mut handle = streams
        .open(&url, OpenMode::read_only(), OpenFlags::CODE_LOAD, None)
        .map_err(|e| format!("open failed: {e}"))?;
    let fresh = !handle.eof();
    let mut out = Vec::new();
    handle
        .read_to_end(&mut out)
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(fresh && handle.eof())
}
