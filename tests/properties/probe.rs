//! Property tests for remote probe classification.

use proptest::prelude::*;

use hoist::application::probe::{classify_port_probe, classify_service_status, PORT_FREE_MARKER};
use hoist::{PortStatus, ServiceState};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Classification never panics on arbitrary probe output.
    #[test]
    fn property_classifiers_never_panic(output in ".{0,200}", port in 1u16..) {
        let _ = classify_port_probe(&output, port);
        let _ = classify_service_status(&output);
    }

    /// PROPERTY: A socket line for the port wins over the free marker.
    #[test]
    fn property_listening_socket_means_in_use(port in 1u16.., noise in "[a-z ]{0,20}") {
        let output = format!(
            "{noise}\ntcp  0  0 0.0.0.0:{port}  0.0.0.0:*  LISTEN\n{PORT_FREE_MARKER}\n"
        );
        prop_assert_eq!(classify_port_probe(&output, port), PortStatus::InUse);
    }

    /// PROPERTY: A longer port sharing the prefix is not a match.
    #[test]
    fn property_port_prefix_is_not_a_match(port in 1u16..6553, digit in 0u8..10) {
        let longer = format!("{port}{digit}");
        let output = format!("tcp  0  0 0.0.0.0:{longer}  0.0.0.0:*  LISTEN\n{PORT_FREE_MARKER}\n");
        prop_assert_eq!(classify_port_probe(&output, port), PortStatus::Available);
    }

    /// PROPERTY: Only the exact word "active" on the first line means active.
    #[test]
    fn property_active_requires_exact_word(word in "[a-z]{1,12}") {
        let state = classify_service_status(&format!("{word}\n"));
        prop_assert_eq!(state == ServiceState::Active, word == "active");
    }
}
