/// Defines the error type shared by the read and write halves of a transport.
///
/// Finding the device, claiming its vendor interface and picking the bulk endpoints
/// ([crate::consts::ENDPOINT_OUT], [crate::consts::ENDPOINT_IN]) is up to the implementor.
/// The transport has to stay open for as long as commands are sent through it.
pub trait Transport {
    type DriverError;
}

/// Host to device half of a transport.
pub trait TransportWrite: Transport {
    /// Writes the whole buffer as one transfer or fails.
    fn write(&mut self, buffer: &[u8]) -> Result<(), Self::DriverError>;
}

/// Device to host half of a transport.
pub trait TransportRead: Transport {
    /// Blocks until the buffer is completely filled or fails.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::DriverError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type DriverError = T::DriverError;
}

impl<T: TransportWrite + ?Sized> TransportWrite for &mut T {
    fn write(&mut self, buffer: &[u8]) -> Result<(), Self::DriverError> {
        (**self).write(buffer)
    }
}

impl<T: TransportRead + ?Sized> TransportRead for &mut T {
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::DriverError> {
        (**self).read(buffer)
    }
}

/// Transport over any blocking byte stream, for example a usbfs bulk pipe
/// or a serial bridge.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
}

#[cfg(feature = "std")]
impl<T: std::io::Read + std::io::Write> IoTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<T> Transport for IoTransport<T> {
    type DriverError = std::io::Error;
}

#[cfg(feature = "std")]
impl<T: std::io::Write> TransportWrite for IoTransport<T> {
    fn write(&mut self, buffer: &[u8]) -> Result<(), Self::DriverError> {
        self.inner.write_all(buffer)?;
        self.inner.flush()
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Read> TransportRead for IoTransport<T> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::DriverError> {
        self.inner.read_exact(buffer)
    }
}
