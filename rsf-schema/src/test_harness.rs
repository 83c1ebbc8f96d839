//! Record types shared by the tests of the RSF crates.
#![allow(missing_docs)]

use crate::{FieldSpec, Record, RecordValue, Value};

pub struct Snapshot {
    pub date: &'static str,
    pub name: &'static str,
    pub verified: bool,
}

impl Record for Snapshot {
    fn describe() -> Vec<FieldSpec> {
        vec![
            FieldSpec::fixed_string("date", 10).skip(),
            FieldSpec::string("name"),
            FieldSpec::bool("verified"),
        ]
    }

    fn values(&self) -> RecordValue {
        vec![
            Value::fixed(self.date),
            Value::from(self.name),
            Value::from(self.verified),
        ]
    }
}

/// A company with an array of dated snapshots, indexed by date.
pub struct Company {
    pub company: &'static str,
    pub ready: bool,
    pub list: Vec<Snapshot>,
    pub age: i64,
    pub rating: f64,
}

impl Record for Company {
    fn describe() -> Vec<FieldSpec> {
        vec![
            FieldSpec::string("company"),
            FieldSpec::bool("ready"),
            FieldSpec::array::<Snapshot>("list").index("date"),
            FieldSpec::int64("age"),
            FieldSpec::float64("rating"),
        ]
    }

    fn values(&self) -> RecordValue {
        vec![
            Value::from(self.company),
            Value::from(self.ready),
            Value::array(&self.list),
            Value::from(self.age),
            Value::from(self.rating),
        ]
    }
}

/// Serializes to a 97 byte schema block and a 132 byte data block.
pub fn posit() -> Company {
    Company {
        company: "posit",
        ready: true,
        list: vec![
            Snapshot {
                date: "2020-06-30",
                name: "from 2020",
                verified: true,
            },
            Snapshot {
                date: "2021-06-30",
                name: "from 2021",
                verified: false,
            },
            Snapshot {
                date: "2022-06-30",
                name: "this is from 2022",
                verified: true,
            },
        ],
        age: 55,
        rating: 92.689,
    }
}

pub struct Address {
    pub street: &'static str,
    pub zip: &'static str,
}

impl Record for Address {
    fn describe() -> Vec<FieldSpec> {
        vec![
            FieldSpec::string("street"),
            FieldSpec::fixed_string("zip", 5),
        ]
    }

    fn values(&self) -> RecordValue {
        vec![Value::from(self.street), Value::fixed(self.zip)]
    }
}

/// A record with a nested record and an array without an index key.
pub struct Office {
    pub id: i64,
    pub address: Address,
    pub tags: Vec<Tag>,
}

impl Record for Office {
    fn describe() -> Vec<FieldSpec> {
        vec![
            FieldSpec::int64("id"),
            FieldSpec::nested::<Address>("address"),
            FieldSpec::array::<Tag>("tags"),
        ]
    }

    fn values(&self) -> RecordValue {
        vec![
            Value::from(self.id),
            Value::nested(&self.address),
            Value::array(&self.tags),
        ]
    }
}

pub struct Tag {
    pub label: &'static str,
}

impl Record for Tag {
    fn describe() -> Vec<FieldSpec> {
        vec![FieldSpec::string("label")]
    }

    fn values(&self) -> RecordValue {
        vec![Value::from(self.label)]
    }
}

pub fn office() -> Office {
    Office {
        id: 7,
        address: Address {
            street: "Main St",
            zip: "02110",
        },
        tags: vec![Tag { label: "hq" }, Tag { label: "remote" }],
    }
}
