/// Outcome of [`KeyCoordinator::get`](super::KeyCoordinator::get).
#[derive(Debug)]
pub enum Lookup<R, W> {
    /// The entry exists (possibly still being filled by another request).
    Hit {
        /// Cursor at offset zero.
        reader: R,
    },
    /// The entry was just created; the caller must fill it through `writer`.
    Populate {
        /// Cursor at offset zero over the new entry.
        reader: R,
        /// The entry's only writer.
        writer: W,
    },
}

impl<R, W> Lookup<R, W> {
    /// Returns `true` for [`Lookup::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit { .. })
    }

    /// Returns the cursor regardless of variant.
    pub fn reader(&self) -> &R {
        match self {
            Lookup::Hit { reader } | Lookup::Populate { reader, .. } => reader,
        }
    }

    /// Splits into the cursor and, on a miss, the writer.
    pub fn into_parts(self) -> (R, Option<W>) {
        match self {
            Lookup::Hit { reader } => (reader, None),
            Lookup::Populate { reader, writer } => (reader, Some(writer)),
        }
    }
}
