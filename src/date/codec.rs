//! JSON, RFC 3339 text and binary encodings of [`Date`].
//!
//! Every decoder re-normalizes what it reads and overwrites `self` only on
//! success.
//!
//! # Binary layout (version 1, big endian)
//! | bytes | field |
//! |-------|-------|
//! | 1 | version (`1`) |
//! | 8 | Unix seconds (`i64`) |
//! | 4 | nanoseconds (`u32`) |
//! | 4 | offset east of UTC in seconds (`i32`) |
//! | 1 | zone tag: `0` UTC, `1` Local, `2` fixed, `3` named |
//! | 1 + n | tag `3` only: name length, then the IANA name |

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Offset, SecondsFormat, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::{Date, Zone};
use crate::error::DateError;

const BINARY_VERSION: u8 = 1;

const TAG_UTC: u8 = 0;
const TAG_LOCAL: u8 = 1;
const TAG_FIXED: u8 = 2;
const TAG_NAMED: u8 = 3;

fn take<'a, const N: usize>(input: &mut &'a [u8]) -> Result<[u8; N], DateError> {
    let bytes: &'a [u8] = input;
    let (head, tail) = bytes
        .split_first_chunk::<N>()
        .ok_or_else(|| DateError::decode("binary", "unexpected end of input"))?;
    *input = tail;
    Ok(*head)
}

fn parse_rfc3339(format: &'static str, text: &str) -> Result<Date, DateError> {
    let dt = DateTime::parse_from_rfc3339(text).map_err(|e| DateError::decode(format, e))?;
    let zone = Zone::from_offset_seconds(dt.offset().local_minus_utc()).unwrap_or(Zone::Utc);
    Ok(Date::from_instant(dt.with_timezone(&zone)))
}

impl Date {
    /// Encodes the instant and its zone in the versioned binary layout.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(24);
        buf.push(BINARY_VERSION);
        buf.extend_from_slice(&self.instant.timestamp().to_be_bytes());
        buf.extend_from_slice(&self.instant.timestamp_subsec_nanos().to_be_bytes());
        buf.extend_from_slice(&self.offset_seconds().to_be_bytes());
        match self.location() {
            Zone::Utc => buf.push(TAG_UTC),
            Zone::Local => buf.push(TAG_LOCAL),
            Zone::Fixed(_) => buf.push(TAG_FIXED),
            Zone::Named(tz) => {
                let name = tz.name().as_bytes();
                buf.push(TAG_NAMED);
                // IANA names are far shorter than 255 bytes.
                buf.push(name.len() as u8);
                buf.extend_from_slice(name);
            }
        }
        buf
    }

    /// Decodes [`Date::marshal_binary`] output.
    ///
    /// # Errors
    /// [`DateError::Decode`] on a wrong version, truncated or trailing
    /// bytes, an invalid offset or an unknown zone name.
    pub fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), DateError> {
        let mut input = data;
        let [version] = take::<1>(&mut input)?;
        if version != BINARY_VERSION {
            return Err(DateError::decode(
                "binary",
                format!("unsupported version {version}"),
            ));
        }
        let secs = i64::from_be_bytes(take(&mut input)?);
        let nanos = u32::from_be_bytes(take(&mut input)?);
        let offset = i32::from_be_bytes(take(&mut input)?);
        let [tag] = take::<1>(&mut input)?;

        let fixed = || {
            FixedOffset::east_opt(offset)
                .map(Zone::Fixed)
                .ok_or_else(|| DateError::decode("binary", format!("invalid offset {offset}")))
        };
        let utc = DateTime::from_timestamp(secs, nanos)
            .ok_or_else(|| DateError::decode("binary", format!("timestamp {secs}s out of range")))?;

        let zone = match tag {
            TAG_UTC => Zone::Utc,
            // Another machine's local zone: keep the stored offset unless
            // ours agrees at that instant.
            TAG_LOCAL => {
                let local = Local.offset_from_utc_datetime(&utc.naive_utc()).fix();
                if local.local_minus_utc() == offset {
                    Zone::Local
                } else {
                    fixed()?
                }
            }
            TAG_FIXED => fixed()?,
            TAG_NAMED => {
                let [len] = take::<1>(&mut input)?;
                let len = usize::from(len);
                if input.len() < len {
                    return Err(DateError::decode("binary", "unexpected end of input"));
                }
                let (name, rest) = input.split_at(len);
                input = rest;
                let name = std::str::from_utf8(name).map_err(|e| DateError::decode("binary", e))?;
                Zone::Named(
                    Tz::from_str(name)
                        .map_err(|_| DateError::decode("binary", format!("unknown zone {name:?}")))?,
                )
            }
            other => {
                return Err(DateError::decode(
                    "binary",
                    format!("unknown zone tag {other}"),
                ));
            }
        };
        if !input.is_empty() {
            return Err(DateError::decode(
                "binary",
                format!("{} trailing bytes", input.len()),
            ));
        }

        *self = Date::from_instant(utc.with_timezone(&zone));
        Ok(())
    }

    /// RFC 3339 text, e.g. `2012-12-11T00:00:00Z`.
    ///
    /// # Errors
    /// [`DateError::OutOfRange`] for years outside `0..=9999`, which RFC 3339
    /// cannot represent.
    pub fn marshal_text(&self) -> Result<String, DateError> {
        if !(0..=9999).contains(&self.year()) {
            return Err(DateError::OutOfRange(format!(
                "year {} has no RFC 3339 form",
                self.year()
            )));
        }
        Ok(self.instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Decodes RFC 3339 text. The zone is UTC for a zero offset and a fixed
    /// offset otherwise.
    pub fn unmarshal_text(&mut self, data: &[u8]) -> Result<(), DateError> {
        let text = std::str::from_utf8(data).map_err(|e| DateError::decode("text", e))?;
        *self = parse_rfc3339("text", text)?;
        Ok(())
    }

    /// A quoted RFC 3339 JSON string.
    pub fn marshal_json(&self) -> Result<Vec<u8>, DateError> {
        let text = self.marshal_text()?;
        serde_json::to_vec(&text).map_err(|e| DateError::decode("json", e))
    }

    /// Decodes a JSON string holding RFC 3339 text. JSON `null` leaves the
    /// value unchanged.
    ///
    /// # Example
    /// ```
    /// use wzs_date::Date;
    ///
    /// let mut d = Date::default();
    /// d.unmarshal_json(br#""2012-12-11T15:04:05+02:00""#).unwrap();
    /// assert_eq!(d.to_string(), "2012-12-11");
    ///
    /// d.unmarshal_json(b"null").unwrap();
    /// assert_eq!(d.to_string(), "2012-12-11");
    /// ```
    pub fn unmarshal_json(&mut self, data: &[u8]) -> Result<(), DateError> {
        let text: Option<String> =
            serde_json::from_slice(data).map_err(|e| DateError::decode("json", e))?;
        if let Some(text) = text {
            *self = parse_rfc3339("json", &text)?;
        }
        Ok(())
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self
            .marshal_text()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_rfc3339("text", &text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Date> {
        vec![
            Date::new(2012, 12, 11, Zone::Utc).unwrap(),
            Date::new(1969, 7, 20, Zone::Fixed(FixedOffset::east_opt(7200).unwrap())).unwrap(),
            Date::new(2024, 2, 29, Zone::Named(Tz::Asia__Tokyo)).unwrap(),
            Date::new(1890, 1, 1, Zone::Named(Tz::America__New_York)).unwrap(),
            Date::new(2012, 12, 11, Zone::Fixed(FixedOffset::east_opt(0).unwrap())).unwrap(),
            Date::zero(),
        ]
    }

    #[test]
    fn binary_round_trip_keeps_zone() {
        for date in samples() {
            let mut back = Date::default();
            back.unmarshal_binary(&date.marshal_binary()).unwrap();
            assert_eq!(back, date);
            assert_eq!(back.location(), date.location());
            assert_eq!(back.to_string(), date.to_string());
        }
    }

    #[test]
    fn binary_round_trip_local_zone() {
        let date = Date::new(2012, 12, 11, Zone::Local).unwrap();
        let mut back = Date::default();
        back.unmarshal_binary(&date.marshal_binary()).unwrap();
        assert_eq!(back, date);
        assert_eq!(back.location(), Zone::Local);
    }

    #[test]
    fn binary_zero_offset_fixed_zone_is_not_utc() {
        let zero = FixedOffset::east_opt(0).unwrap();
        let date = Date::from(zero.with_ymd_and_hms(2012, 12, 11, 5, 0, 0).unwrap());
        let mut back = Date::default();
        back.unmarshal_binary(&date.marshal_binary()).unwrap();
        assert_eq!(back.location(), Zone::Fixed(zero));
        assert_eq!(back.zone(), ("+00:00".to_owned(), 0));
    }

    /// Bytes written where the local zone had another offset decode to that
    /// offset, so the calendar date survives.
    #[test]
    fn binary_local_zone_from_another_machine_keeps_its_date() {
        let midnight = chrono::NaiveDate::from_ymd_opt(2012, 12, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let local = Local.offset_from_utc_datetime(&midnight).fix().local_minus_utc();
        // one minute away from the local offset never matches it
        let offset = if local > 0 { local - 60 } else { local + 60 };
        let secs = midnight.and_utc().timestamp() - i64::from(offset);

        let mut bytes = vec![BINARY_VERSION];
        bytes.extend_from_slice(&secs.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&offset.to_be_bytes());
        bytes.push(TAG_LOCAL);

        let mut back = Date::default();
        back.unmarshal_binary(&bytes).unwrap();
        let zone = Zone::Fixed(FixedOffset::east_opt(offset).unwrap());
        assert_eq!(back.location(), zone);
        assert_eq!(back.ymd(), (2012, 12, 11));
        assert_eq!(back, Date::new(2012, 12, 11, zone).unwrap());
    }

    #[test]
    fn binary_layout_for_utc() {
        let date = Date::new(1970, 1, 2, Zone::Utc).unwrap();
        let bytes = date.marshal_binary();

        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[0], BINARY_VERSION);
        assert_eq!(&bytes[1..9], &86_400i64.to_be_bytes());
        assert_eq!(&bytes[9..13], &[0, 0, 0, 0]);
        assert_eq!(&bytes[13..17], &[0, 0, 0, 0]);
        assert_eq!(bytes[17], TAG_UTC);
    }

    #[test]
    fn binary_decode_rejects_malformed_input() {
        let good = Date::new(2012, 12, 11, Zone::Named(Tz::Europe__Paris))
            .unwrap()
            .marshal_binary();

        let mut wrong_version = good.clone();
        wrong_version[0] = 9;
        let mut unknown_tag = good.clone();
        unknown_tag[17] = 42;
        let mut trailing = good.clone();
        trailing.push(0);

        for bad in [
            Vec::new(),
            good[..10].to_vec(),
            good[..good.len() - 1].to_vec(),
            wrong_version,
            unknown_tag,
            trailing,
        ] {
            let mut target = Date::new(2000, 1, 1, Zone::Utc).unwrap();
            let err = target.unmarshal_binary(&bad).unwrap_err();
            assert!(matches!(err, DateError::Decode { format: "binary", .. }), "{bad:?}");
            assert_eq!(target.to_string(), "2000-01-01", "target must be untouched");
        }
    }

    #[test]
    fn binary_decode_renormalizes() {
        let mut bytes = Date::new(2012, 12, 11, Zone::Utc).unwrap().marshal_binary();
        // 13:00:00 on the same day
        bytes[1..9].copy_from_slice(&(1_355_184_000i64 + 13 * 3600).to_be_bytes());

        let mut d = Date::default();
        d.unmarshal_binary(&bytes).unwrap();
        assert_eq!(d, Date::new(2012, 12, 11, Zone::Utc).unwrap());
        assert_eq!(d.clock(), (0, 0, 0));
    }

    #[test]
    fn text_encoding() {
        let date = Date::new(2012, 12, 11, Zone::Utc).unwrap();
        assert_eq!(date.marshal_text().unwrap(), "2012-12-11T00:00:00Z");

        let plus2 = Date::new(2012, 12, 11, Zone::Fixed(FixedOffset::east_opt(7200).unwrap())).unwrap();
        assert_eq!(plus2.marshal_text().unwrap(), "2012-12-11T00:00:00+02:00");
    }

    #[test]
    fn text_and_json_round_trip() {
        for date in samples() {
            let mut back = Date::default();
            back.unmarshal_text(date.marshal_text().unwrap().as_bytes()).unwrap();
            assert_eq!(back, date);

            let mut back = Date::default();
            back.unmarshal_json(&date.marshal_json().unwrap()).unwrap();
            assert_eq!(back, date);
        }
    }

    #[test]
    fn text_decode_renormalizes_and_keeps_offset() {
        let mut d = Date::default();
        d.unmarshal_text(b"2012-12-11T23:30:00-05:00").unwrap();
        assert_eq!(d.to_string(), "2012-12-11");
        assert_eq!(d.clock(), (0, 0, 0));
        assert_eq!(d.zone().1, -5 * 3600);
    }

    #[test]
    fn json_decode_errors() {
        let mut d = Date::new(2000, 1, 1, Zone::Utc).unwrap();
        let inputs: [&[u8]; 4] = [b"{", b"42", b"\"2012-12-11\"", b"\"not a date\""];
        for bad in inputs {
            let err = d.unmarshal_json(bad).unwrap_err();
            assert!(matches!(err, DateError::Decode { format: "json", .. }));
        }
        assert_eq!(d.to_string(), "2000-01-01");
    }

    #[test]
    fn marshal_rejects_years_beyond_rfc3339() {
        let far = Date::new(10_000, 1, 1, Zone::Utc).unwrap();
        assert!(matches!(far.marshal_text(), Err(DateError::OutOfRange(_))));
        assert!(far.marshal_json().is_err());
    }

    #[test]
    fn serde_field_round_trip() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Task {
            name: String,
            deadline: Date,
            done_on: Option<Date>,
        }

        let task = Task {
            name: "release".into(),
            deadline: Date::new(2012, 12, 11, Zone::Utc).unwrap(),
            done_on: None,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"name":"release","deadline":"2012-12-11T00:00:00Z","done_on":null}"#
        );

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
