//! Integration tests exercising the public archiving surface end-to-end,
//! with both derived and hand-written Parcelable variants.

use keepsake_core::{archive, parcelable, registry, unarchive, Coder, CoderError, Parcelable};

#[parcelable]
#[derive(PartialEq)]
struct State {
    count: i32,
}

#[parcelable(tag = "app.Other")]
#[derive(PartialEq)]
struct Other {
    label: String,
}

#[parcelable]
#[derive(PartialEq)]
struct Profile {
    name: String,
    admin: bool,
}

/// A screen snapshot with a required nested value, a nullable nested
/// value, and a field archived under a custom key.
#[parcelable]
#[derive(PartialEq)]
struct Session {
    #[parcelable(rename = "screen_title")]
    title: String,
    profile: Profile,
    previous: Option<State>,
    #[parcelable(skip)]
    scratch: i32,
}

#[test]
fn state_scenario() {
    // Encode State { count: 42 } under "state".
    let mut coder = Coder::encoder();
    coder
        .encode_parcelable(Some(&State { count: 42 }), "state")
        .unwrap();
    let payload = coder.into_payload().unwrap();

    // Decoding "state" as State returns the value.
    let coder = Coder::from_payload(&payload).unwrap();
    assert_eq!(
        coder.decode_parcelable::<State>("state").unwrap(),
        Some(State { count: 42 })
    );

    // Decoding "state" as a different registered variant returns absent.
    assert_eq!(coder.decode_parcelable::<Other>("state").unwrap(), None);

    // Decoding "missing" returns absent.
    assert_eq!(coder.decode_parcelable::<State>("missing").unwrap(), None);
}

#[test]
fn derived_variants_register_themselves() {
    // No manual registration anywhere in this file: the derive emits the
    // registry submission, so decode works from bytes alone.
    let payload = archive(&Other {
        label: "hello".to_string(),
    })
    .unwrap();
    let restored = unarchive::<Other>(&payload).unwrap();
    assert_eq!(restored.map(|o| o.label), Some("hello".to_string()));
}

#[test]
fn derived_tag_override() {
    assert_eq!(Other::TYPE_TAG, "app.Other");
    assert_eq!(State::TYPE_TAG, "State");
}

#[test]
fn nested_session_roundtrip() {
    let session = Session {
        title: "settings".to_string(),
        profile: Profile {
            name: "ada".to_string(),
            admin: true,
        },
        previous: Some(State { count: 3 }),
        scratch: 99,
    };

    let payload = archive(&session).unwrap();
    let restored = unarchive::<Session>(&payload).unwrap().unwrap();

    assert_eq!(restored.title, "settings");
    assert_eq!(restored.profile, session.profile);
    assert_eq!(restored.previous, Some(State { count: 3 }));
    // Skipped fields are not archived; they come back as Default.
    assert_eq!(restored.scratch, 0);
}

#[test]
fn nullable_nested_absent_roundtrip() {
    let session = Session {
        title: "home".to_string(),
        profile: Profile {
            name: "lin".to_string(),
            admin: false,
        },
        previous: None,
        scratch: 0,
    };

    let payload = archive(&session).unwrap();
    let restored = unarchive::<Session>(&payload).unwrap().unwrap();
    assert_eq!(restored.previous, None);
}

#[test]
fn renamed_field_travels_under_custom_key() {
    let session = Session {
        title: "renamed".to_string(),
        profile: Profile {
            name: "kim".to_string(),
            admin: false,
        },
        previous: None,
        scratch: 0,
    };

    let mut coder = Coder::encoder();
    session.encode(&mut coder).unwrap();
    let payload = coder.into_payload().unwrap();

    let coder = Coder::from_payload(&payload).unwrap();
    assert_eq!(coder.decode_string("screen_title").unwrap(), "renamed");
    let err = coder.decode_string("title").unwrap_err();
    assert!(matches!(err, CoderError::MissingKey(_)));
}

#[test]
fn derived_fields_travel_in_declaration_order() {
    let session = Session {
        title: "ordered".to_string(),
        profile: Profile {
            name: "ada".to_string(),
            admin: true,
        },
        previous: Some(State { count: 1 }),
        scratch: 0,
    };

    let mut coder = Coder::encoder();
    session.encode(&mut coder).unwrap();
    let payload = coder.into_payload().unwrap();

    // The payload's top-level map lists the keys in the order the struct
    // declares its fields; skipped fields never reach the wire.
    let value: ciborium::value::Value = ciborium::de::from_reader(payload.as_slice()).unwrap();
    let ciborium::value::Value::Map(entries) = value else {
        panic!("payload is not a keyed map");
    };
    let keys: Vec<&str> = entries.iter().filter_map(|(k, _)| k.as_text()).collect();
    assert_eq!(keys, ["screen_title", "profile", "previous"]);
}

#[test]
fn shape_mismatch_recovers_as_first_launch() {
    let payload = archive(&State { count: 42 }).unwrap();

    // The caller asked for a shape that was never saved: absent, not an
    // error, so the caller composes its own default.
    let restored = unarchive::<Profile>(&payload).unwrap();
    let profile = restored.unwrap_or(Profile {
        name: "guest".to_string(),
        admin: false,
    });
    assert_eq!(profile.name, "guest");
}

#[test]
fn payload_survives_storage_boundary() {
    // Payloads are opaque bytes for an external transport; a copy decodes
    // identically to the original.
    let payload = archive(&State { count: -7 }).unwrap();
    let stored: Vec<u8> = payload.clone();
    drop(payload);

    let restored = unarchive::<State>(&stored).unwrap();
    assert_eq!(restored, Some(State { count: -7 }));
}

#[test]
fn manual_impl_interops_with_derived() {
    #[derive(Debug, Clone, PartialEq)]
    struct Legacy {
        state: State,
        note: String,
    }

    impl Parcelable for Legacy {
        const TYPE_TAG: &'static str = "app.Legacy";

        fn encode(&self, coder: &mut Coder) -> Result<(), CoderError> {
            coder.encode_parcelable(Some(&self.state), "state")?;
            coder.encode_string(&self.note, "note")
        }

        fn decode(coder: &Coder) -> Result<Self, CoderError> {
            Ok(Legacy {
                state: coder
                    .decode_parcelable("state")?
                    .ok_or_else(|| CoderError::MissingKey("state".to_string()))?,
                note: coder.decode_string("note")?,
            })
        }
    }

    registry::register::<Legacy>();

    let legacy = Legacy {
        state: State { count: 1 },
        note: "carried over".to_string(),
    };
    let payload = archive(&legacy).unwrap();
    assert_eq!(unarchive::<Legacy>(&payload).unwrap(), Some(legacy));
}

#[test]
fn multibyte_text_through_nested_holder() {
    let payload = archive(&Other {
        label: "état 状態 🗂".to_string(),
    })
    .unwrap();
    let restored = unarchive::<Other>(&payload).unwrap().unwrap();
    assert_eq!(restored.label, "état 状態 🗂");
}
