use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::NormalizerError;
use crate::types::{MiscValue, NormalizedRecord};

/// CSV column order. JSON objects use the same keys.
pub const CSV_COLUMNS: [&str; 37] = [
    "program",
    "instruction",
    "signature",
    "err",
    "slot",
    "blocktime",
    "fee",
    "auth1",
    "auth2",
    "auth3",
    "source",
    "destination",
    "misc1",
    "misc2",
    "misc3",
    "misc4",
    "amount",
    "uiAmount",
    "signers",
    "owner",
    "preBalance_sol",
    "postBalance_sol",
    "changeBalance_sol",
    "accountIndex_inc",
    "account_inc",
    "mint_inc",
    "preBalance_inc",
    "postBalance_inc",
    "changeBalance_inc",
    "accountIndex_dec",
    "account_dec",
    "mint_dec",
    "preBalance_dec",
    "postBalance_dec",
    "changeBalance_dec",
    "ownerTokenBalanceChanges_overflow",
    "trade",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}', expected csv or json")),
        }
    }
}

/// Render `records` in `format`. `csv_header` and `pretty` only apply to their format.
pub fn render(
    records: &[NormalizedRecord],
    format: OutputFormat,
    csv_header: bool,
    pretty: bool,
) -> Result<String, NormalizerError> {
    match format {
        OutputFormat::Csv => to_csv(records, csv_header),
        OutputFormat::Json => to_json(records, pretty),
    }
}

pub fn to_json(records: &[NormalizedRecord], pretty: bool) -> Result<String, NormalizerError> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

/// Every field is double quoted, embedded quotes are doubled and rows end with `\n`.
pub fn to_csv(records: &[NormalizedRecord], header: bool) -> Result<String, NormalizerError> {
    let mut out = String::with_capacity(512 * (records.len() + 1));
    if header {
        let mut row = CsvRow::new(&mut out);
        for column in CSV_COLUMNS {
            row.text(Some(column));
        }
        row.finish();
    }
    for record in records {
        write_record(&mut out, record)?;
    }
    Ok(out)
}

fn write_record(out: &mut String, record: &NormalizedRecord) -> Result<(), NormalizerError> {
    let mut row = CsvRow::new(out);
    row.text(Some(&record.program));
    row.text(Some(&record.instruction));
    row.text(Some(&record.signature));
    row.value(record.err.as_ref())?;
    row.unsigned(Some(record.slot));
    row.signed(record.blocktime);
    row.float(Some(record.fee));
    row.text(record.auth1.as_deref());
    row.text(record.auth2.as_deref());
    row.text(record.auth3.as_deref());
    row.text(record.source.as_deref());
    row.text(record.destination.as_deref());
    row.misc(record.misc1.as_ref())?;
    row.misc(record.misc2.as_ref())?;
    row.misc(record.misc3.as_ref())?;
    row.misc(record.misc4.as_ref())?;
    row.unsigned(record.amount);
    row.float(record.ui_amount);
    row.json(Some(&record.signers))?;
    row.text(record.owner.as_deref());
    row.float(record.pre_balance_sol);
    row.float(record.post_balance_sol);
    row.float(record.change_balance_sol);
    row.unsigned(record.account_index_inc.map(|index| index as u64));
    row.text(record.account_inc.as_deref());
    row.text(record.mint_inc.as_deref());
    row.float(record.pre_balance_inc);
    row.float(record.post_balance_inc);
    row.float(record.change_balance_inc);
    row.unsigned(record.account_index_dec.map(|index| index as u64));
    row.text(record.account_dec.as_deref());
    row.text(record.mint_dec.as_deref());
    row.float(record.pre_balance_dec);
    row.float(record.post_balance_dec);
    row.float(record.change_balance_dec);
    row.json(record.owner_token_balance_changes_overflow.as_ref())?;
    row.unsigned(Some(record.trade.into()));
    row.finish();
    Ok(())
}

struct CsvRow<'a> {
    out: &'a mut String,
    first: bool,
    num: itoa::Buffer,
}

impl<'a> CsvRow<'a> {
    fn new(out: &'a mut String) -> Self {
        Self {
            out,
            first: true,
            num: itoa::Buffer::new(),
        }
    }

    fn open(&mut self) {
        if !self.first {
            self.out.push(',');
        }
        self.first = false;
        self.out.push('"');
    }

    fn text(&mut self, value: Option<&str>) {
        self.open();
        if let Some(value) = value {
            for ch in value.chars() {
                if ch == '"' {
                    self.out.push('"');
                }
                self.out.push(ch);
            }
        }
        self.out.push('"');
    }

    fn unsigned(&mut self, value: Option<u64>) {
        self.open();
        if let Some(value) = value {
            self.out.push_str(self.num.format(value));
        }
        self.out.push('"');
    }

    fn signed(&mut self, value: Option<i64>) {
        self.open();
        if let Some(value) = value {
            self.out.push_str(self.num.format(value));
        }
        self.out.push('"');
    }

    fn float(&mut self, value: Option<f64>) {
        self.open();
        if let Some(value) = value {
            // String formatting does not fail
            let _ = write!(self.out, "{value}");
        }
        self.out.push('"');
    }

    fn json<T: Serialize>(&mut self, value: Option<&T>) -> Result<(), NormalizerError> {
        let rendered = value.map(serde_json::to_string).transpose()?;
        self.text(rendered.as_deref());
        Ok(())
    }

    fn value(&mut self, value: Option<&Value>) -> Result<(), NormalizerError> {
        match value {
            None | Some(Value::Null) => self.text(None),
            Some(Value::String(text)) => self.text(Some(text)),
            Some(other) => self.json(Some(other))?,
        }
        Ok(())
    }

    fn misc(&mut self, value: Option<&MiscValue>) -> Result<(), NormalizerError> {
        match value {
            None => self.text(None),
            Some(MiscValue::Unsigned(number)) => self.unsigned(Some(*number)),
            Some(MiscValue::Signed(number)) => self.signed(Some(*number)),
            Some(MiscValue::Text(text)) => self.text(Some(text)),
            Some(MiscValue::List(items)) => self.json(Some(items))?,
        }
        Ok(())
    }

    fn finish(self) {
        self.out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenBalanceChange;

    fn record() -> NormalizedRecord {
        NormalizedRecord {
            program: "system".to_string(),
            instruction: "Transfer".to_string(),
            signature: "sig".to_string(),
            slot: 42,
            blocktime: Some(1_700_000_000),
            fee: 0.000005,
            source: Some("A".to_string()),
            destination: Some("B".to_string()),
            misc1: Some(MiscValue::Text("say \"hi\"".to_string())),
            misc2: Some(MiscValue::Unsigned(9)),
            amount: Some(1_500_000_000),
            ui_amount: Some(1.5),
            signers: vec!["A".to_string()],
            owner: Some("A".to_string()),
            ..NormalizedRecord::default()
        }
    }

    fn split_row(line: &str) -> Vec<String> {
        // Quoted fields only; a comma inside quotes never starts a new field.
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn header_lists_all_columns() {
        let csv = to_csv(&[], true).unwrap();
        insta::assert_snapshot!(csv.trim_end(), @r###""program","instruction","signature","err","slot","blocktime","fee","auth1","auth2","auth3","source","destination","misc1","misc2","misc3","misc4","amount","uiAmount","signers","owner","preBalance_sol","postBalance_sol","changeBalance_sol","accountIndex_inc","account_inc","mint_inc","preBalance_inc","postBalance_inc","changeBalance_inc","accountIndex_dec","account_dec","mint_dec","preBalance_dec","postBalance_dec","changeBalance_dec","ownerTokenBalanceChanges_overflow","trade""###);
    }

    #[test]
    fn rows_have_fixed_width_and_quoting() {
        let mut with_overflow = record();
        with_overflow.owner_token_balance_changes_overflow = Some(vec![TokenBalanceChange {
            account_index: 2,
            account: "C".to_string(),
            mint: "M".to_string(),
            pre_balance: 1.0,
            post_balance: 3.0,
            change_balance: 2.0,
        }]);
        let csv = to_csv(&[record(), with_overflow], true).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(split_row(line).len(), CSV_COLUMNS.len());
        }

        let fields = split_row(lines[1]);
        assert_eq!(fields[0], "system");
        assert_eq!(fields[3], "");
        assert_eq!(fields[6], "0.000005");
        assert_eq!(fields[12], "say \"hi\"");
        assert_eq!(fields[13], "9");
        assert_eq!(fields[16], "1500000000");
        assert_eq!(fields[17], "1.5");
        assert_eq!(fields[18], r#"["A"]"#);
        assert_eq!(fields[36], "0");
        assert!(lines[1].contains(r#""say ""hi""""#));

        let overflow = split_row(lines[2]);
        assert!(overflow[35].starts_with(r#"[{"accountIndex":2"#));
    }

    #[test]
    fn json_uses_column_names() {
        let json = to_json(&[record()], false).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let object = value[0].as_object().unwrap();
        assert_eq!(object.len(), CSV_COLUMNS.len());
        for column in CSV_COLUMNS {
            assert!(object.contains_key(column), "missing {column}");
        }
        assert_eq!(value[0]["uiAmount"], 1.5);
        assert_eq!(value[0]["ownerTokenBalanceChanges_overflow"], Value::Null);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
