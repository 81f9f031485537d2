use serde::Serialize;

/// Shortest run of printable bytes reported as a string.
pub const MIN_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsciiString {
    pub offset: usize,
    pub text: String,
}

impl core::fmt::Display for AsciiString {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "0x{:06X}: {}", self.offset, self.text)
    }
}

/// Finds every maximal run of at least `min_len` printable ASCII bytes.
pub fn ascii_strings(data: &[u8], min_len: usize) -> Vec<AsciiString> {
    let mut out = vec![];
    let mut run_start = None;
    for (i, b) in data.iter().chain([&0]).enumerate() {
        match (run_start, (0x20..=0x7e).contains(b)) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                if i - start >= min_len {
                    out.push(AsciiString {
                        offset: start,
                        text: data[start..i].iter().map(|&c| c as char).collect(),
                    });
                }
                run_start = None;
            }
            _ => {}
        }
    }
    out
}
