use embedded_hal_async::spi::{self, Operation};
use mockall::{mock, Sequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiError;

impl spi::Error for SpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

mock! {
    #[derive(Debug)]
    pub SpiDevice {}

    impl spi::SpiDevice<u8> for SpiDevice {
        async fn transaction<'a>(&mut self, operations: &mut [Operation<'a, u8>]) -> Result<(), SpiError>;
    }

    impl spi::ErrorType for SpiDevice {
        type Error = SpiError;
    }
}

/// One operation expected inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// The driver writes exactly these bytes.
    Write(Vec<u8>),
    /// The driver reads as many bytes as given, and receives them.
    Read(Vec<u8>),
}

impl Expect {
    fn matches(&self, actual: &Operation<'_, u8>) -> bool {
        match (self, actual) {
            (Expect::Write(expected), Operation::Write(actual)) => expected.as_slice() == *actual,
            (Expect::Read(expected), Operation::Read(actual)) => expected.len() == actual.len(),
            _ => false,
        }
    }

    fn assign(&self, dest: &mut Operation<'_, u8>) {
        if let (Expect::Read(src), Operation::Read(dest)) = (self, dest) {
            dest.copy_from_slice(src);
        }
    }
}

impl MockSpiDevice {
    /// Expect one transaction made of exactly `expected`, as the next step in `seq`.
    pub fn expect_operations(&mut self, seq: &mut Sequence, expected: Vec<Expect>) {
        let matcher = expected.clone();
        self.expect_transaction()
            .withf(move |operations| {
                operations.len() == matcher.len()
                    && operations
                        .iter()
                        .zip(&matcher)
                        .all(|(actual, expected)| expected.matches(actual))
            })
            .times(1)
            .in_sequence(seq)
            .returning(move |operations| {
                for (dest, src) in operations.iter_mut().zip(&expected) {
                    src.assign(dest);
                }
                Ok(())
            });
    }

    /// Expect a single write of `tx`.
    pub fn expect_write(&mut self, seq: &mut Sequence, tx: &[u8]) {
        self.expect_operations(seq, vec![Expect::Write(tx.to_vec())]);
    }

    /// Expect a write of `tx` followed by a read that returns `rx`.
    pub fn expect_write_read(&mut self, seq: &mut Sequence, tx: &[u8], rx: &[u8]) {
        self.expect_operations(
            seq,
            vec![Expect::Write(tx.to_vec()), Expect::Read(rx.to_vec())],
        );
    }

    /// Fail the next transaction, whatever it contains.
    pub fn expect_failure(&mut self, seq: &mut Sequence) {
        self.expect_transaction()
            .times(1)
            .in_sequence(seq)
            .returning(|_| Err(SpiError));
    }
}
