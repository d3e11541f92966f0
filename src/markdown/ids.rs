use rand::RngExt;

const ID_PREFIX: &str = "code-";
const RANDOM_ID_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hands out element ids for code blocks.
pub trait IdGenerator {
    /// Called once per render, before any block is emitted.
    fn reset(&mut self) {}

    fn next_id(&mut self) -> String;
}

/// Fresh random ids on every call; repeated renders of one input differ.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        let mut value = rand::rng().random::<u64>();
        let mut id = String::with_capacity(ID_PREFIX.len() + RANDOM_ID_LEN);
        id.push_str(ID_PREFIX);
        for _ in 0..RANDOM_ID_LEN {
            id.push(BASE36[(value % 36) as usize] as char);
            value /= 36;
        }
        id
    }
}

/// `code-1`, `code-2`, ... counted from 1 on each render.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: usize,
}

impl IdGenerator for SequentialIds {
    fn reset(&mut self) {
        self.next = 0;
    }

    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{ID_PREFIX}{}", self.next)
    }
}
