//! Binary user x item basket construction.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::{Item, Observation, UserId};
use crate::errors::MiningError;

/// The distinct items one user has purchased. Multiplicity is not tracked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transaction(BTreeSet<Item>);

impl Transaction {
    pub fn contains(&self, item: &Item) -> bool {
        self.0.contains(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Items in ascending order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.0.iter()
    }
}

impl FromIterator<Item> for Transaction {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Transactions keyed by user, in order of each user's first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionMatrix {
    users: Vec<UserId>,
    transactions: Vec<Transaction>,
    positions: HashMap<UserId, usize>,
}

impl TransactionMatrix {
    /// Assemble a matrix from pre-grouped baskets. Repeated users are merged.
    pub fn from_baskets<I, T>(baskets: I) -> Result<Self, MiningError>
    where
        I: IntoIterator<Item = (UserId, T)>,
        T: IntoIterator<Item = Item>,
    {
        let mut matrix = Self::default();
        for (user, items) in baskets {
            let slot = matrix.slot_for(user);
            matrix.transactions[slot].0.extend(items);
        }

        if matrix.is_empty() {
            return Err(MiningError::EmptyInput);
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, user: &UserId) -> Option<&Transaction> {
        self.positions.get(user).map(|&index| &self.transactions[index])
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Transaction)> {
        self.users.iter().zip(self.transactions.iter())
    }

    fn slot_for(&mut self, user: UserId) -> usize {
        if let Some(&index) = self.positions.get(&user) {
            return index;
        }

        let index = self.transactions.len();
        self.positions.insert(user.clone(), index);
        self.users.push(user);
        self.transactions.push(Transaction::default());
        index
    }
}

/// Groups raw observations into one binary-encoded transaction per user.
#[derive(Clone, Debug, Default)]
pub struct TransactionMatrixBuilder;

impl TransactionMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, observations: &[Observation]) -> Result<TransactionMatrix, MiningError> {
        if observations.is_empty() {
            return Err(MiningError::EmptyInput);
        }

        let mut matrix = TransactionMatrix::default();
        for observation in observations {
            let slot = matrix.slot_for(observation.user_id.clone());
            matrix.transactions[slot].0.insert(observation.item());
        }

        tracing::debug!(
            event_name = "mining.matrix.built",
            observations = observations.len(),
            users = matrix.len(),
            "transaction matrix built"
        );
        Ok(matrix)
    }
}
