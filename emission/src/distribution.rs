//! The fixed genesis distribution table.

use std::collections::HashMap;

use serde::Serialize;
use suncoin_types::{Address, EmissionParams};

use crate::error::EmissionError;

/// Reserved distribution addresses in genesis order.
///
/// Each holds `max_coin_supply / distribution_addresses_total` coins at
/// genesis. Position in this table is significant: the unlocked tranche is
/// always a prefix of it.
pub const DISTRIBUTION_ADDRESSES: [&str; 100] = [
    "2EvQ2MwPeqXqaHs9qRFzWAoByz4ph64jSKU",
    "2BR9QGdm5hMxRkr4C5M21DXjWvxB26WjHeX",
    "Nnw5SgEKuUmsHGWBSzashbf5D98AUouXUh",
    "YVj3NEsacjsM67iPfyMY59vPuecwnp6QWz",
    "25Dvmd5uBvmZNsTRVDEBsQ6JRVpqqe7gDNe",
    "22oySh75yDv9vtBYHqgfYydEV8atTBwAnpp",
    "3Lrz2bDGcT7DprDeMJZ2guEyivAJ2phvtG",
    "td595rUgWWzMsZcudMnTVYiW6BRvaghPKw",
    "2ADzbt8F186254xMG6DvyMCfbsXdeiLA2qn",
    "NCpnHjMN9ta94SzJLZoFqCq9jpNqsHmeRh",
    "2JkBfkkvypKCsJYRVgMHwuTupf5u6j21onr",
    "2AgYKqcGFru1pkFbheNUzWkvKUKjY859AEJ",
    "2fJ7F7vviEWVRFBRKHGQVN59YiSKS2KPg5X",
    "2HnBLgUiZ3s843ik9RqgnArSNPXdagP99M1",
    "7wGF8xvTyVuKMAEsUWzbNqrmEwp56PoMcG",
    "2HzvsMgGU7Pg3pkg13AFAmt93cw2gEWiPc8",
    "2MURz4XbBRKriEL9UV8ixxZA837Hmpgtaqc",
    "2F3cbdN2tf1nKS6h5nfzUeMnoj7uRkjLy8e",
    "t4hvfvVChVk6qVajCnoqTTGNP4FTftJytu",
    "2bJsY7zjFH6iq6Fs1fnyX2LpzB6rPXVPWXC",
    "2R3MVa4AeY3UoZF2nubYDuxTesU91kiD2jd",
    "joVSFdo4CaA19Y2jbJJZ5BJyitZqBnmX9M",
    "Rw68wydU8cE33YLnNYq2eDksARfChZYFEp",
    "dDuYLwRQ1yvt9iQetEKrUGhPivAxB9n5M1",
    "2jWneyxn84PByzXMRTE3hnCJtNxBEYC2ufv",
    "D9KZjrFN2etU2SHFBA2G7jDSddh6ZCy26M",
    "b8KG4qRuxkHt29mpP5LNUuwQwBZhUG6RJB",
    "2LfmBFMFAsNf2ZDyNEwoH8RWNHmxSbQvqSb",
    "ruKpSMdayPGyFtYG9EH2QTpcrmTvF4EjAV",
    "2iej2x3fEk4sraSXeShVu65KH2NUAvJFg9N",
    "qcu4nqYcX5rGC3EmoXU8q22vDcPUMpPYXY",
    "2YhrGpKUWXfHrtW6c9FKVKqYrxVHVBXGind",
    "2H5mmwbibJz9KxpwRAuZ4ezvTSDL8iNUQGH",
    "zeh9v9afW7a3Ji5e7SGdzb3Sk2xajTXUMf",
    "xV3XQzAR86Y6r7qA49BsFcLxpQ4xhtASq7",
    "EtNKuCeca61htJigtYuove3Yb6H2Scpitk",
    "kfzfkb7TBQLGaBSN4ssjyfMNfscYjdYcy5",
    "27AKWwt4pxtixUM9PAG4J1at7w8oBivJms5",
    "2F5HzZU4RNYZbjmbCCXbDAsHAcqmAMZkpkp",
    "bnEUiH3HVq95pySibLRxHrTLgxQJhsTgRi",
    "7n9m5HZrVDVCNmVYirkG6WB18fHRnF3ZwK",
    "2GpNJcvfoBLTd21oVFvGmvyshmu5GjUDNgA",
    "2LM8uSr35BvyXNihhzTdSNasbYVX4yEGuUi",
    "zhixmLqy3fYcRUAMZZZuABtwVnxwfXriV3",
    "9n5yUAhSwbGZMMhC7KFNCjZnqC918tnjoY",
    "2m6PiUioXSQKAQCqVj7T5fzrVMAi5DX8tU5",
    "2Dspnm7nyGZhtTB5z8imUoQGfgo1SS6EwpC",
    "JHcV8bshqMKatNsBGLqrGWrzH7SDJepcS1",
    "2DDHTwwtBssBeGmoJS9XsVBXnDiwk5HC3tb",
    "2cAg1FEdMnPZH87xUcRtAoppFdRYwQ4YtcC",
    "LPbrt9qoyj8FCGF2dfBb699xyzg5kCc4Q4",
    "QkHTDahAxUh4UDZpTeU2CGkdBrC5QUcPQu",
    "23XWhmcbvDta6CSFC1gh2hiSUbxHjEtKuum",
    "2ceiFAce8qiFo4f6Lnwo7C3UKSUbgmxULPJ",
    "2Ve4PB7skoMyvVZNfnCd5CXkgoocM7i9kHp",
    "CXTjHi3RrUVu6rf3yNiJXbuCeMreSKA1ko",
    "2VyZQNNtdqn8XZzuUsWHzhJyjvzScoPM1sX",
    "2UZsufCFj8njZjXEXUiqeLSf2W5TYc8EfF5",
    "Dnsmrt8PcecpTr6nL8aA4ojmTu48ASU29b",
    "2JGbfKLTkuBqp4qdbnf6ozMwk1UjmEUNS6P",
    "23yiZLFkJpfbgYouDW7xV5ts8VnrLfveGD8",
    "giW9AvmytkeVxu8SPa8twnosu3Rk6rY5b6",
    "21b7EtTzmKaK1axChQDA3JmXpqCJKXbJ9z7",
    "2DYKHug2b52ekqe7Fk3FT3rt5Y72A8vELwk",
    "2BTttXwBVcBv5GvzGiW9V2aBwTfmkoT1DeP",
    "KDNQ85saCEzsAdwZTZqmarcc38MyDJxNbt",
    "23ZepZd1z21F5UiQTAq4y93XCrxRb558PGs",
    "2HKxSby8dchYjfHnMLkjGZCELDhqDs9jGJS",
    "LC3E2iur5MjbN9L6WhxTYW6ApiMU6hCygs",
    "2kg2qEKjhzdpPrGbV7Sp96muaC8VuJmdTRU",
    "237xfxqmsCnRoxRt51YyLe2iNgkXFUfbZB9",
    "2scTNQnfyZaDHPAhJxqMufYNa6pzzgmFJB",
    "B9Whv9d9TGYC7AHi9QJnANa1f2dY3Jny1r",
    "2EnSJzmbNdKNW8BBHavyTkVtyt6Y7j25ETd",
    "MdDzJg7RGqffo87XpmEVvFGPHAnpr9YmeS",
    "6Pc7ibaQ4CHQLH4HygrgRY9dMcGtRVoqSs",
    "2ZHRzCmZvdQV5R1Fi2c2STAo82VkHqgmvuc",
    "2Xay2CH2usdPYRDwoqQusMPxDEAuS76aAm2",
    "dtEeRybvCVVLeXqbmi4tzzzD5AMYFeeH9A",
    "2SpbEq7LzbEFvZFAFqR7fXBH9aibD2B6iQM",
    "CE5aNvp4qcBeHgaSyF5rFh9k6MamdyfHna",
    "2cEnxLn6h2ojHGC5TRS2BSSy7fgfFodi8dA",
    "WnW3cnehTBAsVDZ7nY8sNb2NM6NQabMPpe",
    "2hFKt4uBBpaT2Qt4QDuWi3cX3rAqQKKwtba",
    "6PxJUUfxZCGhMNueFCsPhGeCNHyXmCmPsd",
    "2atTZmiLmu8oxabcHUYFvQ9KcxMSAtxSKnu",
    "CRjdXLQb4CFbXxcEw2ER42Z95EJamjHkeB",
    "21TaWiWTCZBnC5Mhr8FFGkcg37jdjS12GPc",
    "27sZ4KJbJtbhgiBgtzsNknRc7H7h8YwDNq5",
    "w4MD35w8PTeexgQvbDPMpMf1UhZUVGkdhD",
    "A6FFCRPe7BvgE8oy7o5dhnuSVfSo8vtnkB",
    "2UawChW9sj9EEaVyimore9sbov3fRzif66k",
    "8Eb9dhfj6aTJf6os4M7zmaH1Gy95fmufUD",
    "2GW2zRVkxUkyGGxb4jXvA3TJVX13eS4AjTU",
    "FfsRWPhMRoSMmRFcmMb1knQiAC8RZDRNnA",
    "i5fkXenkrwfBhQUpMLYExJt4T8HYm5Swor",
    "2Q2FJJKULZHjbYdP8Nx5C4cBpoX8nw2gh4a",
    "2PWe6GiM3oKExhXsPHSbwnf3A5fffMKPEE7",
    "nP3BsoFkpbQgYHtp8onsQTFh32VkFQWibB",
    "w2xGLPgGgyTkSVnRgXhyiGpugxCFyMAFpc",
];

/// One entry of the reserved address table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReservedAddress {
    /// Position in the table, `0..distribution_addresses_total`.
    pub ordinal: usize,
    pub address: Address,
    pub initial_balance: u64,
    pub locked: bool,
}

/// The parsed, validated distribution table together with its parameters.
///
/// Immutable once built; share it by reference.
#[derive(Clone, Debug)]
pub struct ReservedAddressTable {
    params: EmissionParams,
    addresses: Vec<Address>,
}

impl ReservedAddressTable {
    /// Validate `params` and parse `addresses` into a table.
    ///
    /// Fails if the supply does not divide evenly across the addresses, if
    /// the table length disagrees with the parameters, or if any address is
    /// malformed or repeated.
    pub fn new(params: EmissionParams, addresses: &[&str]) -> Result<Self, EmissionError> {
        params.validate()?;
        if addresses.len() as u64 != params.distribution_addresses_total {
            return Err(EmissionError::TableSize {
                expected: params.distribution_addresses_total,
                actual: addresses.len(),
            });
        }

        let mut seen: HashMap<Address, usize> = HashMap::with_capacity(addresses.len());
        let mut parsed = Vec::with_capacity(addresses.len());
        for (ordinal, text) in addresses.iter().enumerate() {
            let address = Address::from_base58(text)
                .map_err(|source| EmissionError::InvalidAddress { ordinal, source })?;
            if let Some(&first) = seen.get(&address) {
                return Err(EmissionError::DuplicateAddress { ordinal, first });
            }
            seen.insert(address, ordinal);
            parsed.push(address);
        }

        Ok(Self {
            params,
            addresses: parsed,
        })
    }

    /// The production table with the default emission parameters.
    pub fn mainnet() -> Result<Self, EmissionError> {
        Self::new(EmissionParams::default(), &DISTRIBUTION_ADDRESSES)
    }

    pub fn params(&self) -> &EmissionParams {
        &self.params
    }

    /// All reserved addresses in table order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Coins held by each reserved address at genesis.
    pub fn initial_balance(&self) -> u64 {
        self.params.distribution_address_initial_balance()
    }

    /// Index of the first locked entry.
    pub(crate) fn unlocked_len(&self) -> usize {
        // validate() guarantees initial_unlocked_count <= len
        self.params.initial_unlocked_count as usize
    }

    /// Every entry with its derived lock state.
    pub fn entries(&self) -> impl Iterator<Item = ReservedAddress> + '_ {
        let unlocked = self.unlocked_len();
        let balance = self.initial_balance();
        self.addresses
            .iter()
            .enumerate()
            .map(move |(ordinal, &address)| ReservedAddress {
                ordinal,
                address,
                initial_balance: balance,
                locked: ordinal >= unlocked,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_table_loads() {
        let table = ReservedAddressTable::mainnet().expect("mainnet table is valid");
        assert_eq!(table.len(), 100);
        assert_eq!(table.initial_balance(), 3_000_000);
        assert_eq!(
            table.addresses()[0].to_string(),
            "2EvQ2MwPeqXqaHs9qRFzWAoByz4ph64jSKU"
        );
    }

    #[test]
    fn uneven_supply_fails_initialization() {
        let params = EmissionParams {
            distribution_addresses_total: 99,
            ..EmissionParams::default()
        };
        let err = ReservedAddressTable::new(params, &DISTRIBUTION_ADDRESSES[..99]).unwrap_err();
        assert!(matches!(err, EmissionError::Params(_)));
    }

    #[test]
    fn table_length_must_match_params() {
        let err = ReservedAddressTable::new(EmissionParams::default(), &DISTRIBUTION_ADDRESSES[..50])
            .unwrap_err();
        assert_eq!(
            err,
            EmissionError::TableSize {
                expected: 100,
                actual: 50
            }
        );
    }

    #[test]
    fn duplicate_addresses_are_rejected() {
        let params = EmissionParams {
            max_coin_supply: 300,
            distribution_addresses_total: 3,
            initial_unlocked_count: 1,
            ..EmissionParams::default()
        };
        let addrs = [
            DISTRIBUTION_ADDRESSES[0],
            DISTRIBUTION_ADDRESSES[1],
            DISTRIBUTION_ADDRESSES[0],
        ];
        let err = ReservedAddressTable::new(params, &addrs).unwrap_err();
        assert_eq!(err, EmissionError::DuplicateAddress { ordinal: 2, first: 0 });
    }

    #[test]
    fn malformed_address_reports_its_ordinal() {
        let params = EmissionParams {
            max_coin_supply: 200,
            distribution_addresses_total: 2,
            initial_unlocked_count: 1,
            ..EmissionParams::default()
        };
        let err = ReservedAddressTable::new(params, &[DISTRIBUTION_ADDRESSES[0], "not-an-address"])
            .unwrap_err();
        assert!(matches!(err, EmissionError::InvalidAddress { ordinal: 1, .. }));
    }

    #[test]
    fn entries_mark_prefix_unlocked() {
        let table = ReservedAddressTable::mainnet().unwrap();
        let entries: Vec<_> = table.entries().collect();
        assert!(!entries[0].locked);
        assert!(entries[1..].iter().all(|e| e.locked));
        assert!(entries.iter().all(|e| e.initial_balance == 3_000_000));
    }
}
