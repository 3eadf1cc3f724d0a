//! Random identifier source.

use rand::Rng;

use crate::application::ports::IdSource;
use crate::domain::naming::{LABEL_ALPHABET, LABEL_LEN};

/// `IdSource` backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn hex_suffix(&self) -> String {
        format!("{:08x}", rand::rng().random::<u32>())
    }

    fn subdomain_label(&self) -> String {
        let mut rng = rand::rng();
        (0..LABEL_LEN)
            .map(|_| char::from(LABEL_ALPHABET[rng.random_range(0..LABEL_ALPHABET.len())]))
            .collect()
    }
}
