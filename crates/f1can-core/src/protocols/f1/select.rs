use super::error::F1Error;
use super::layout::MAX_PARTICIPANTS;

/// A decoded packet carrying one record per participant slot.
pub trait ParticipantPacket {
    type Record: Copy;

    fn participants(&self) -> &[Self::Record; MAX_PARTICIPANTS];
}

/// Take the record at `index` out of `packet`, dropping the rest of the grid.
///
/// The index is trusted as reported by the header classifier; it is not
/// cross-checked against the packet's own header.
///
/// # Errors
/// `F1Error::IndexOutOfRange` when `index` is not in `0..MAX_PARTICIPANTS`.
pub fn select_participant<P: ParticipantPacket>(
    packet: P,
    index: usize,
) -> Result<P::Record, F1Error> {
    packet
        .participants()
        .get(index)
        .copied()
        .ok_or(F1Error::IndexOutOfRange {
            index,
            len: MAX_PARTICIPANTS,
        })
}

#[cfg(test)]
mod tests {
    use super::select_participant;
    use crate::protocols::f1::decode_telemetry;
    use crate::protocols::f1::error::F1Error;
    use crate::synth::TelemetryDatagram;

    #[test]
    fn selects_requested_slot() {
        let mut datagram = TelemetryDatagram::new(0);
        for (index, car) in datagram.cars.iter_mut().enumerate() {
            car.speed = index as u16 * 10;
        }
        let bytes = datagram.encode();
        for index in 0..22 {
            let packet = decode_telemetry(&bytes).unwrap();
            let car = select_participant(packet, index).unwrap();
            assert_eq!(car.speed, index as u16 * 10);
        }
    }

    #[test]
    fn rejects_indices_past_grid() {
        let bytes = TelemetryDatagram::new(0).encode();
        for index in [22usize, 23, 255, usize::MAX] {
            let packet = decode_telemetry(&bytes).unwrap();
            let err = select_participant(packet, index).unwrap_err();
            assert_eq!(err, F1Error::IndexOutOfRange { index, len: 22 });
        }
    }
}
