//! Quality-of-service descriptor.

/// One million, the default for several QoS bounds.
pub const MILLION: u32 = 1000 * 1000;

/// Quality-of-service specification attached to a flow.
///
/// The layout matches the C `qosspec_t` so the value can be handed to a
/// C control function by pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QosSpec {
    /// Maximum delay in milliseconds.
    pub delay: u32,
    /// Bandwidth in bits per second.
    pub bandwidth: u64,
    /// Availability as a class of nines.
    pub availability: u8,
    /// Packet loss.
    pub loss: u32,
    /// Bit error rate, errors per billion bits.
    pub ber: u32,
    /// Non-zero requests in-order delivery.
    pub in_order: u8,
    /// Maximum interruption in milliseconds.
    pub max_gap: u32,
    /// Cypher strength in bits, 0 means no encryption.
    pub cypher_s: u16,
}

impl Default for QosSpec {
    fn default() -> Self {
        Self {
            delay: MILLION,
            bandwidth: 0,
            availability: 0,
            loss: 1,
            ber: MILLION,
            in_order: 0,
            max_gap: MILLION,
            cypher_s: 0,
        }
    }
}

impl QosSpec {
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay = delay_ms;
        self
    }

    pub fn with_bandwidth(mut self, bits_per_sec: u64) -> Self {
        self.bandwidth = bits_per_sec;
        self
    }

    pub fn with_availability(mut self, nines: u8) -> Self {
        self.availability = nines;
        self
    }

    pub fn with_loss(mut self, loss: u32) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_ber(mut self, ber: u32) -> Self {
        self.ber = ber;
        self
    }

    pub fn with_in_order(mut self, in_order: bool) -> Self {
        self.in_order = u8::from(in_order);
        self
    }

    pub fn with_max_gap(mut self, max_gap_ms: u32) -> Self {
        self.max_gap = max_gap_ms;
        self
    }

    pub fn with_cypher_strength(mut self, bits: u16) -> Self {
        self.cypher_s = bits;
        self
    }

    /// Whether in-order delivery was requested.
    pub fn is_in_order(&self) -> bool {
        self.in_order != 0
    }

    /// Whether the flow is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.cypher_s != 0
    }
}
