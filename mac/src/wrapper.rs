use super::*;
use keyweave_core::{
    primitive_set::{Entry, PrimitiveSet},
    wrapper::PrimitiveWrapper,
};
use std::borrow::Cow;

/// Wraps a primitive set of MACs into one [`Mac`].
///
/// The wrapped MAC tags with the primary key, prefixing the tag with the
/// primary's output prefix. Verification first tries the keys whose prefix
/// matches the start of the tag, against the rest of the tag, then every
/// `Raw` key against the whole tag. Keys are tried in the order they were
/// added and the first that verifies wins.
pub struct MacWrapper;

impl PrimitiveWrapper<dyn Mac> for MacWrapper {
    fn wrap(&self, primitives: PrimitiveSet<dyn Mac>) -> Result<Box<dyn Mac>> {
        primitives.primary()?;
        Ok(Box::new(WrappedMac {
            primitives: Arc::new(primitives),
        }))
    }
}

struct WrappedMac {
    primitives: Arc<PrimitiveSet<dyn Mac>>,
}

// Legacy keys authenticate the data followed by the legacy format version byte
fn framed_data<'a>(entry: &Entry<dyn Mac>, data: &'a [u8]) -> Cow<'a, [u8]> {
    if entry.output_prefix_type() == OutputPrefixType::Legacy {
        let mut framed = Vec::with_capacity(data.len() + 1);
        framed.extend_from_slice(data);
        framed.push(prefix::LEGACY_FORMAT_VERSION);
        Cow::Owned(framed)
    } else {
        Cow::Borrowed(data)
    }
}

impl Mac for WrappedMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let primary = self.primitives.primary()?;
        let tag = primary
            .primitive()
            .compute_mac(&framed_data(primary, data))?;

        let mut mac = Vec::with_capacity(primary.identifier().len() + tag.len());
        mac.extend_from_slice(primary.identifier());
        mac.extend_from_slice(&tag);
        Ok(mac)
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        if let Some((identifier, tag)) = prefix::split(mac) {
            for entry in self.primitives.primitives(identifier) {
                if entry
                    .primitive()
                    .verify_mac(tag, &framed_data(entry, data))
                    .is_ok()
                {
                    return Ok(());
                }
            }
        }

        // Raw tags carry no prefix, so any raw key may have produced the whole value
        for entry in self.primitives.raw_primitives() {
            if entry.primitive().verify_mac(mac, data).is_ok() {
                return Ok(());
            }
        }

        trace!("No key verified the MAC");
        Err(Error::VerificationFailed)
    }
}
