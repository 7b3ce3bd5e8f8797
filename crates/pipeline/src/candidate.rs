/// A byte-vector flowing through the pipe fabric, carrying the score its upstream pipe
/// last assigned it (`0.0` for candidates that have not yet been scored).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bytes: Vec<u8>,
    pub score: f64,
}

impl Candidate {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, score: 0.0 }
    }

    pub fn scored(bytes: Vec<u8>, score: f64) -> Self {
        Self { bytes, score }
    }
}
